//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its
//! translation into HTTP responses. The core never maps errors to status
//! codes; that happens only here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::ConfigError;
use page_tracker_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error while applying database migrations at startup.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, field, message) = match self {
            ApiError::Port(PortError::Validation { field, message }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION", Some(field), message)
            }
            ApiError::Port(err @ PortError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", None, err.to_string())
            }
            ApiError::Port(err @ PortError::Conflict { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONFLICT",
                None,
                err.to_string(),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                None,
                other.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "field": field,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
