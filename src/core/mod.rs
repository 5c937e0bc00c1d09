//! Core module containing the fundamental types and contracts of the framework

pub mod access;
pub mod audit;
pub mod context;
pub mod entity;
pub mod error;
pub mod field;
pub mod filter;
pub mod mapper;
pub mod order;
pub mod page;
pub mod relation;
pub mod service;

pub use access::{Grant, Operation, Principal, RoleGrant};
pub use audit::{AuditAction, AuditDraft, AuditOutcome, AuditRecord, AuditSink};
pub use context::{RequestContext, RequestOrigin};
pub use entity::{ComboOption, Entity, EntityKind, Record};
pub use error::{Error, Result};
pub use field::{FieldDescriptor, FieldKind, FieldScalar, FieldValue, Schema};
pub use filter::{Comparator, Filter, LogicalOp};
pub use mapper::Mapper;
pub use order::{parse_order, OrderBy, SortDirection};
pub use page::{Page, Pageable};
pub use relation::{parse_relations, Relation};
pub use service::CrudService;
