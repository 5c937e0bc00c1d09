//! Entity-scoped access control
//!
//! Permissions are (entity-kind, operation) pairs. A principal carries
//! grants directly and through named roles; the effective set is the union
//! of both. Resolution is recomputed per call, no caching, since typical
//! role/permission sets are small.

use crate::core::entity::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The closed set of guarded operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Associate,
    Dissociate,
    Enable,
    Disable,
    Login,
    Logout,
    Approve,
    Reject,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Associate => "associate",
            Operation::Dissociate => "dissociate",
            Operation::Enable => "enable",
            Operation::Disable => "disable",
            Operation::Login => "login",
            Operation::Logout => "logout",
            Operation::Approve => "approve",
            Operation::Reject => "reject",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (entity-kind, operation) permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub entity: String,
    pub operation: Operation,
}

impl Grant {
    pub fn new(entity: impl Into<String>, operation: Operation) -> Self {
        Self {
            entity: entity.into(),
            operation,
        }
    }

    /// Whether this grant covers the given kind and operation
    pub fn covers(&self, entity: EntityKind, operation: Operation) -> bool {
        self.entity == entity.as_str() && self.operation == operation
    }
}

/// A named role carrying its own grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub name: String,
    pub grants: Vec<Grant>,
}

impl RoleGrant {
    pub fn new(name: impl Into<String>, grants: Vec<Grant>) -> Self {
        Self {
            name: name.into(),
            grants,
        }
    }
}

/// The authenticated caller
///
/// Carries everything the permission layer needs; resolved once per request
/// by the principal resolver and passed down through the request context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub grants: Vec<Grant>,
    pub roles: Vec<RoleGrant>,
}

impl Principal {
    pub fn new(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            grants: Vec::new(),
            roles: Vec::new(),
        }
    }

    /// Add a direct grant
    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grants.push(grant);
        self
    }

    /// Add a role with its grants
    pub fn with_role(mut self, role: RoleGrant) -> Self {
        self.roles.push(role);
        self
    }

    /// The union of direct grants and every role's grants
    ///
    /// Recomputed on each call; duplicates are not deduplicated since
    /// membership checks do not care.
    pub fn effective_grants(&self) -> Vec<&Grant> {
        self.grants
            .iter()
            .chain(self.roles.iter().flat_map(|role| role.grants.iter()))
            .collect()
    }

    /// Whether the principal may perform `operation` on `entity`
    pub fn allows(&self, entity: EntityKind, operation: Operation) -> bool {
        self.effective_grants()
            .iter()
            .any(|grant| grant.covers(entity, operation))
    }
}
