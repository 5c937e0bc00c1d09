//! HTTP error envelope mapping crate errors onto status codes

use crate::core::error::Error;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error shape every handler returns
///
/// Serializes as `{"error": {"code": ..., "message": ...}}` so clients can
/// branch on the stable `code` tag without parsing prose.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::MalformedFilter { .. } => (StatusCode::BAD_REQUEST, "malformed_filter"),
            Error::MalformedOrder { .. } => (StatusCode::BAD_REQUEST, "malformed_order"),
            Error::InvalidPayload { .. } => (StatusCode::BAD_REQUEST, "invalid_payload"),
            Error::UnknownField { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "unknown_field"),
            Error::TypeMismatch { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "type_mismatch"),
            Error::PermissionDenied { .. } => (StatusCode::FORBIDDEN, "permission_denied"),
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Error::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
            Error::DeadlineExceeded => (StatusCode::GATEWAY_TIMEOUT, "deadline_exceeded"),
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}
