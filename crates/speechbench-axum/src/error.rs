//! Axum-specific error type and its mappings from the core error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use speechbench_core::error::{CoreError, RepositoryError, VendorError};

/// HTTP-facing error type. Every handler returns `Result<T, HttpError>`.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(repo_err) => repo_err.into(),
            CoreError::Vendor(vendor_err) => vendor_err.into(),
            CoreError::Validation(msg) => Self::BadRequest(msg),
            CoreError::Configuration(msg) => Self::Internal(format!("configuration: {msg}")),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<RepositoryError> for HttpError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::AlreadyExists(msg) => Self::Conflict(msg),
            RepositoryError::Storage(msg) => Self::Internal(format!("storage: {msg}")),
            RepositoryError::Serialization(msg) => Self::Internal(format!("serialization: {msg}")),
            RepositoryError::Constraint(msg) => Self::BadRequest(msg),
        }
    }
}

impl From<VendorError> for HttpError {
    fn from(err: VendorError) -> Self {
        match err {
            VendorError::Timeout => Self::ServiceUnavailable("vendor call timed out".to_string()),
            VendorError::UnknownVendor(v) => Self::BadRequest(format!("unknown vendor: {v}")),
            VendorError::CallFailed { message, retryable, .. } if retryable => {
                Self::ServiceUnavailable(message)
            }
            VendorError::CallFailed { message, .. } => Self::BadRequest(message),
        }
    }
}
