//! HTTP mapping for [`Error`].
//!
//! Every error becomes a JSON body `{ "error": <code>, "message": <text> }`.
//! Business-rule messages are passed through verbatim; internal failures are
//! logged and replaced with a generic message.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

impl Error {
    /// Status code and stable machine-readable code for this error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Self::OverpaymentRejected { .. } => (StatusCode::BAD_REQUEST, "overpayment_rejected"),
            Self::InactiveCourse { .. } => (StatusCode::BAD_REQUEST, "inactive_course"),
            Self::InvalidAmount { .. } => (StatusCode::BAD_REQUEST, "invalid_amount"),
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::AlreadyEnrolled { .. } => (StatusCode::CONFLICT, "already_enrolled"),
            Self::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            Self::EmailTaken { .. } => (StatusCode::CONFLICT, "email_taken"),
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            Self::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
            Self::IntegrityFault { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "integrity_fault"),
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = if status.is_server_error() {
            error!(error = %self, code, "Request failed with internal error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
