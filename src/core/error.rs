//! Typed error handling for the scaffolding pipeline
//!
//! One taxonomy covers every layer: the parsers raise the malformed
//! variants, mapper construction raises the schema variants, the permission
//! layer raises `PermissionDenied`, and storage adapters raise `NotFound`,
//! `Storage`, and `DeadlineExceeded`. The HTTP boundary maps the taxonomy
//! onto status codes and the JSON envelope in
//! [`ApiError`](crate::server::error::ApiError).

use crate::core::access::Operation;
use crate::core::entity::EntityKind;
use thiserror::Error;
use uuid::Uuid;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// The error taxonomy for the scaffolding pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Filter string violates the grammar (client input)
    #[error("malformed filter: {detail}")]
    MalformedFilter { detail: String },

    /// Order string violates the grammar (client input)
    #[error("malformed order: {detail}")]
    MalformedOrder { detail: String },

    /// Payload rejected by an application validation hook (client input)
    #[error("invalid payload: {detail}")]
    InvalidPayload { detail: String },

    /// A named field does not exist on a shape (programmer error,
    /// fatal at startup when raised during mapper construction)
    #[error("unknown field `{field}` on {shape}")]
    UnknownField { shape: String, field: String },

    /// Two same-named fields carry different types (programmer error)
    #[error("type mismatch on field `{field}`: {detail}")]
    TypeMismatch { field: String, detail: String },

    /// The acting principal lacks the required grant
    #[error("permission denied: {operation} {entity} for user {user}")]
    PermissionDenied {
        operation: Operation,
        entity: String,
        user: Uuid,
    },

    /// Zero rows where one was expected
    #[error("{entity} not found")]
    NotFound {
        entity: String,
        id: Option<Uuid>,
    },

    /// Opaque wrapped backend failure; never retried at this layer
    #[error("storage error: {message}")]
    Storage { message: String },

    /// The request deadline elapsed before storage work began
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    pub fn malformed_filter(detail: impl Into<String>) -> Self {
        Error::MalformedFilter {
            detail: detail.into(),
        }
    }

    pub fn malformed_order(detail: impl Into<String>) -> Self {
        Error::MalformedOrder {
            detail: detail.into(),
        }
    }

    pub fn invalid_payload(detail: impl Into<String>) -> Self {
        Error::InvalidPayload {
            detail: detail.into(),
        }
    }

    pub fn unknown_field(shape: impl Into<String>, field: impl Into<String>) -> Self {
        Error::UnknownField {
            shape: shape.into(),
            field: field.into(),
        }
    }

    pub fn type_mismatch(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::TypeMismatch {
            field: field.into(),
            detail: detail.into(),
        }
    }

    pub fn permission_denied(operation: Operation, entity: EntityKind, user: Uuid) -> Self {
        Error::PermissionDenied {
            operation,
            entity: entity.as_str().to_string(),
            user,
        }
    }

    pub fn not_found(entity: EntityKind, id: Option<Uuid>) -> Self {
        Error::NotFound {
            entity: entity.as_str().to_string(),
            id,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_shape() {
        let err = Error::not_found(EntityKind::new("user"), Some(Uuid::new_v4()));
        assert_eq!(err.to_string(), "user not found");
    }

    #[test]
    fn test_storage_message_shape() {
        let err = Error::storage("connection reset");
        assert_eq!(err.to_string(), "storage error: connection reset");
    }

    #[test]
    fn test_permission_denied_message_shape() {
        let user = Uuid::new_v4();
        let err = Error::permission_denied(Operation::Delete, EntityKind::new("role"), user);
        assert_eq!(
            err.to_string(),
            format!("permission denied: delete role for user {user}")
        );
    }

    #[test]
    fn test_invalid_payload_message_shape() {
        let err = Error::invalid_payload("email: not an email address");
        assert_eq!(
            err.to_string(),
            "invalid payload: email: not an email address"
        );
    }

    #[test]
    fn test_constructors_pick_the_matching_variant() {
        assert!(matches!(
            Error::malformed_filter("x"),
            Error::MalformedFilter { .. }
        ));
        assert!(matches!(
            Error::malformed_order("x"),
            Error::MalformedOrder { .. }
        ));
        assert!(matches!(
            Error::unknown_field("UserAccount", "nope"),
            Error::UnknownField { .. }
        ));
        assert!(matches!(
            Error::type_mismatch("age", "text vs integer"),
            Error::TypeMismatch { .. }
        ));
    }
}
