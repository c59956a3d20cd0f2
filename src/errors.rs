use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::validation::FieldErrors;

/// Stable error envelope returned to clients. The `code` string is the
/// contract client UIs branch on; `message` is free prose and may change.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl ErrorBody {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: code.to_string(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(code: &str, message: impl Into<String>, details: FieldErrors) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: code.to_string(),
                message: message.into(),
                details: Some(details),
            },
        }
    }
}

/// Error taxonomy for the request pipeline. Every variant is recovered
/// locally into a response; nothing propagates past the composition root.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    RateLimitExceeded { message: String, retry_after_secs: u64 },

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    FileRejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Admin access required")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::FileRejected(_) => "FILE_REJECTED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::RateLimitExceeded {
                message,
                retry_after_secs,
            } => {
                let headers = [(header::RETRY_AFTER, retry_after_secs.to_string())];
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    headers,
                    Json(ErrorBody::new("RATE_LIMIT_EXCEEDED", message)),
                )
                    .into_response()
            }
            Self::Validation(field_errors) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::with_details(
                    "VALIDATION_ERROR",
                    "One or more fields failed validation",
                    field_errors,
                )),
            )
                .into_response(),
            Self::FileRejected(reason) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("FILE_REJECTED", reason)),
            )
                .into_response(),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody::new("NOT_FOUND", what)),
            )
                .into_response(),
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("UNAUTHENTICATED", "Authentication required")),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(ErrorBody::new("FORBIDDEN", "Admin access required")),
            )
                .into_response(),
            Self::Internal(detail) => {
                // Log the cause, never leak it to the client
                error!("internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(
                        "INTERNAL_ERROR",
                        "An unexpected error occurred",
                    )),
                )
                    .into_response()
            }
        }
    }
}
