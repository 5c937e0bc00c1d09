//! Shared fixture entity and stack builders for the integration suites
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod harness;
//! use harness::*;
//! ```

#![allow(dead_code)]

use scaffold::core::access::{Grant, Operation, Principal, RoleGrant};
use scaffold::core::audit::{AuditRecord, AuditSink};
use scaffold::core::context::{RequestContext, RequestOrigin};
use scaffold::core::entity::{Entity, EntityKind};
use scaffold::core::service::CrudService;
use scaffold::impl_record;
use scaffold::service::{HookedService, audit_layer, permission_layer};
use scaffold::storage::MemoryRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// The entity every integration suite operates on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub active: bool,
    pub department: Option<String>,
}

impl_record!(Employee {
    id: Uuid,
    name: String,
    email: String,
    age: i64,
    active: bool,
    department: Option<String>,
});

impl Entity for Employee {
    fn kind() -> EntityKind {
        EntityKind::new("employee")
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

pub fn employee(name: &str, age: i64) -> Employee {
    Employee {
        id: Uuid::nil(),
        name: name.to_string(),
        email: format!("{name}@example.com"),
        age,
        active: true,
        department: None,
    }
}

/// Five employees whose names sort ada < ben < cleo < dana < evan
pub fn roster() -> Vec<Employee> {
    vec![
        employee("cleo", 45),
        employee("ada", 36),
        employee("evan", 29),
        employee("ben", 52),
        employee("dana", 41),
    ]
}

/// A principal granted every employee operation through one role
pub fn admin() -> Principal {
    Principal::new(Uuid::new_v4(), "admin").with_role(RoleGrant::new(
        "administrators",
        vec![
            Grant::new("employee", Operation::Create),
            Grant::new("employee", Operation::Read),
            Grant::new("employee", Operation::Update),
            Grant::new("employee", Operation::Delete),
            Grant::new("employee", Operation::Associate),
            Grant::new("employee", Operation::Dissociate),
        ],
    ))
}

/// A principal holding a single direct READ grant
pub fn reader() -> Principal {
    Principal::new(Uuid::new_v4(), "reader").with_grant(Grant::new("employee", Operation::Read))
}

/// A principal with no grants at all
pub fn nobody() -> Principal {
    Principal::new(Uuid::new_v4(), "nobody")
}

pub fn ctx(principal: Principal) -> RequestContext {
    RequestContext::new(principal).with_origin(RequestOrigin::new("192.0.2.10", "harness/1.0"))
}

/// The storage, the audit trail, and the composed stack over both
pub struct Stack {
    pub repo: Arc<MemoryRepository<Employee>>,
    pub trail: Arc<MemoryRepository<AuditRecord>>,
    pub service: Arc<HookedService<Employee>>,
}

/// Build permission over audit over in-memory storage
///
/// The permission layer sits outermost, so a denied call leaves no audit
/// record and never touches storage.
pub fn stacked() -> Stack {
    let repo = Arc::new(MemoryRepository::<Employee>::new());
    let trail = Arc::new(MemoryRepository::<AuditRecord>::new());
    let audited = Arc::new(audit_layer(
        repo.clone() as Arc<dyn CrudService<Employee>>,
        trail.clone() as Arc<dyn AuditSink>,
    ));
    let service = Arc::new(permission_layer(
        audited as Arc<dyn CrudService<Employee>>,
    ));
    Stack {
        repo,
        trail,
        service,
    }
}
