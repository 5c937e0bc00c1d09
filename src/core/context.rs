//! Explicit request-scoped state
//!
//! One `RequestContext` is built per inbound request and passed by
//! reference through every layer: controller → service → hooks → storage.
//! Nothing request-scoped ever lives on a service instance, which keeps
//! composed stacks safe for concurrent use.

use crate::core::access::Principal;
use crate::core::audit::AuditDraft;
use crate::core::error::{Error, Result};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use uuid::Uuid;

/// Where the request came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub ip: String,
    pub user_agent: String,
}

impl RequestOrigin {
    pub fn new(ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: user_agent.into(),
        }
    }
}

impl Default for RequestOrigin {
    fn default() -> Self {
        Self {
            ip: "unknown".to_string(),
            user_agent: "unknown".to_string(),
        }
    }
}

/// Per-request state carried through the pipeline
///
/// Holds the acting principal, the request origin, an optional deadline the
/// storage adapter must honor, and the audit draft the audit hooks fill in.
/// The draft sits behind a mutex because hooks mutate it while the context
/// travels by shared reference.
#[derive(Debug)]
pub struct RequestContext {
    pub principal: Principal,
    pub origin: RequestOrigin,
    deadline: Option<Instant>,
    audit: Mutex<AuditDraft>,
}

impl RequestContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            origin: RequestOrigin::default(),
            deadline: None,
            audit: Mutex::new(AuditDraft::default()),
        }
    }

    /// A context with a nil principal, for flows that skip authorization
    pub fn anonymous() -> Self {
        Self::new(Principal::new(Uuid::nil(), "anonymous"))
    }

    pub fn with_origin(mut self, origin: RequestOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Bound the request: storage work starting after `deadline` fails
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Whether the deadline has already elapsed
    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() > deadline)
    }

    /// Fail fast when the deadline has elapsed
    pub fn check_deadline(&self) -> Result<()> {
        if self.deadline_exceeded() {
            return Err(Error::DeadlineExceeded);
        }
        Ok(())
    }

    /// Mutate the audit draft
    ///
    /// A poisoned lock just means a hook panicked mid-write; the draft data
    /// is still usable, so the poison is swallowed.
    pub fn with_audit<R>(&self, f: impl FnOnce(&mut AuditDraft) -> R) -> R {
        let mut draft = self.audit.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut draft)
    }

    /// Clone the current draft state
    pub fn audit_snapshot(&self) -> AuditDraft {
        self.with_audit(|draft| draft.clone())
    }
}
