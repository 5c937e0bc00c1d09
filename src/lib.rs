//! # Scaffold-RS
//!
//! A generic CRUD scaffolding layer: given an entity type, derive a
//! repository, a hookable service, permission and audit decorators, and a
//! REST router — all parameterized over the entity's shape.
//!
//! ## Features
//!
//! - **Layered CRUD Pipeline**: permission over audit over repository,
//!   composed through one shared contract — every layer is a
//!   [`CrudService`](core::CrudService)
//! - **Lifecycle Hooks**: Before/After/OnFail slots around each operation,
//!   the single extension point every decorator is built from
//! - **Filter Language**: compact string grammar (`field:eq:value`,
//!   `and(...)`, `or(...)`, `not(...)`) compiled into a predicate tree
//! - **Field Mapper**: descriptor-table projection between record shapes
//!   with construction-time type validation
//! - **Explicit Request Context**: principal, origin, deadline, and audit
//!   draft travel as a parameter, never as ambient state
//! - **Macro-Based Entities**: `impl_record!` derives the schema table and
//!   name-based field access
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scaffold::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct UserAccount {
//!     id: Uuid,
//!     username: String,
//! }
//!
//! impl_record!(UserAccount {
//!     id: Uuid,
//!     username: String,
//! });
//!
//! impl Entity for UserAccount {
//!     fn kind() -> EntityKind { EntityKind::new("user") }
//!     fn id(&self) -> Uuid { self.id }
//!     fn set_id(&mut self, id: Uuid) { self.id = id; }
//!     fn display_name(&self) -> &str { &self.username }
//! }
//!
//! // Storage, audited, then permission-checked — outermost runs first.
//! let repo: Arc<dyn CrudService<UserAccount>> = Arc::new(MemoryRepository::new());
//! let trail = Arc::new(MemoryRepository::<AuditRecord>::new());
//! let audited = Arc::new(audit_layer(repo, trail));
//! let stack = Arc::new(permission_layer(audited));
//!
//! ServerBuilder::new()
//!     .expose_entity::<UserAccount>(stack)
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod service;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        access::{Grant, Operation, Principal, RoleGrant},
        audit::{AuditAction, AuditOutcome, AuditRecord, AuditSink},
        context::{RequestContext, RequestOrigin},
        entity::{ComboOption, Entity, EntityKind, Record},
        error::{Error, Result},
        field::{FieldKind, FieldScalar, FieldValue, Schema},
        filter::{Comparator, Filter, LogicalOp},
        mapper::Mapper,
        order::{OrderBy, SortDirection, parse_order},
        page::{Page, Pageable},
        relation::{Relation, parse_relations},
        service::CrudService,
    };

    // === Macros ===
    pub use crate::impl_record;

    // === Service Layers ===
    pub use crate::service::{
        HookFn, HookInput, HookPoint, HookedService, audit_layer, permission_layer,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::MemoryRepository;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{CrudState, PrincipalResolver, ServerBuilder, StaticPrincipalResolver};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, Query, State},
        http::HeaderMap,
        routing::{delete, get, post, put},
    };
}
