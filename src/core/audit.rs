//! Audit trail domain types
//!
//! The audit decorator fills an [`AuditDraft`] carried in the request
//! context while an operation moves through the hook pipeline, then
//! persists a finished [`AuditRecord`] through the [`AuditSink`]
//! capability. `AuditRecord` is itself an entity (kind `audit`), so a
//! composed stack can expose its trail through the same scaffolding it
//! audits.

use crate::core::context::RequestContext;
use crate::core::entity::{Entity, EntityKind};
use crate::core::error::Result;
use crate::core::field::{FieldKind, FieldScalar, FieldValue};
use crate::core::service::CrudService;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a recorded call was doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    #[default]
    None,
    Create,
    Read,
    Update,
    Delete,
    Enable,
    Disable,
    Associate,
    Dissociate,
    Login,
    Logout,
    Approve,
    Reject,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::None => "none",
            AuditAction::Create => "create",
            AuditAction::Read => "read",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Enable => "enable",
            AuditAction::Disable => "disable",
            AuditAction::Associate => "associate",
            AuditAction::Dissociate => "dissociate",
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::Approve => "approve",
            AuditAction::Reject => "reject",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(AuditAction::None),
            "create" => Some(AuditAction::Create),
            "read" => Some(AuditAction::Read),
            "update" => Some(AuditAction::Update),
            "delete" => Some(AuditAction::Delete),
            "enable" => Some(AuditAction::Enable),
            "disable" => Some(AuditAction::Disable),
            "associate" => Some(AuditAction::Associate),
            "dissociate" => Some(AuditAction::Dissociate),
            "login" => Some(AuditAction::Login),
            "logout" => Some(AuditAction::Logout),
            "approve" => Some(AuditAction::Approve),
            "reject" => Some(AuditAction::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldScalar for AuditAction {
    const KIND: FieldKind = FieldKind::Text;

    fn into_value(self) -> FieldValue {
        FieldValue::String(self.as_str().to_string())
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::String(s) => Self::parse(&s),
            _ => None,
        }
    }
}

/// How a recorded call ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    #[default]
    None,
    Success,
    Failure,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::None => "none",
            AuditOutcome::Success => "success",
            AuditOutcome::Failure => "failure",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(AuditOutcome::None),
            "success" => Some(AuditOutcome::Success),
            "failure" => Some(AuditOutcome::Failure),
            _ => None,
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldScalar for AuditOutcome {
    const KIND: FieldKind = FieldKind::Text;

    fn into_value(self) -> FieldValue {
        FieldValue::String(self.as_str().to_string())
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::String(s) => Self::parse(&s),
            _ => None,
        }
    }
}

/// Per-request audit scratchpad, filled in by the audit hooks
#[derive(Debug, Clone, Default)]
pub struct AuditDraft {
    pub action: AuditAction,
    pub result: AuditOutcome,
    pub entity: String,
    pub entity_id: Uuid,
    pub new_value: String,
    pub prev_value: String,
    pub message: String,
}

/// A persisted audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub action: AuditAction,
    pub result: AuditOutcome,
    pub message: String,
    pub user_id: Uuid,
    pub entity: String,
    pub entity_id: Uuid,
    pub new_value: String,
    pub prev_value: String,
    pub ip: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

crate::impl_record!(AuditRecord {
    id: Uuid,
    action: AuditAction,
    result: AuditOutcome,
    message: String,
    user_id: Uuid,
    entity: String,
    entity_id: Uuid,
    new_value: String,
    prev_value: String,
    ip: String,
    user_agent: String,
    created_at: DateTime<Utc>,
});

impl Entity for AuditRecord {
    fn kind() -> EntityKind {
        EntityKind::new("audit")
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.message
    }
}

impl AuditRecord {
    /// Snapshot the draft carried by `ctx` into a persistable record
    pub fn from_context(ctx: &RequestContext) -> Self {
        let draft = ctx.audit_snapshot();
        Self {
            id: Uuid::nil(),
            action: draft.action,
            result: draft.result,
            message: draft.message,
            user_id: ctx.principal.user_id,
            entity: draft.entity,
            entity_id: draft.entity_id,
            new_value: draft.new_value,
            prev_value: draft.prev_value,
            ip: ctx.origin.ip.clone(),
            user_agent: ctx.origin.user_agent.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Capability interface the audit decorator persists through
///
/// Decouples the decorator from any concrete audit storage shape: every
/// `CrudService<AuditRecord>` is a sink, so an audit trail can live on its
/// own repository, behind its own decorators, or in a test double.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, ctx: &RequestContext, entry: AuditRecord) -> Result<()>;
}

#[async_trait]
impl<S> AuditSink for S
where
    S: CrudService<AuditRecord>,
{
    async fn record(&self, ctx: &RequestContext, entry: AuditRecord) -> Result<()> {
        self.create(ctx, entry).await.map(|_| ())
    }
}
