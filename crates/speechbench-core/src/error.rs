//! Core error taxonomy (§7).
//!
//! `RepositoryError` and `VendorError` abstract away storage/transport
//! implementation details. `CoreError` is the canonical error surfaced by
//! engine and service operations; adapters (Axum, CLI) map it to their own
//! wire formats.

use thiserror::Error;

/// Domain-specific errors for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A constraint was violated (e.g. duplicate `(run_item, metric_name)`).
    #[error("constraint violation: {0}")]
    Constraint(String),
}

/// Error returned by a vendor adapter call (§4.2, §7).
#[derive(Debug, Error, Clone)]
pub enum VendorError {
    /// Network error, HTTP non-2xx, empty body, unsupported model/voice.
    #[error("vendor call failed ({status:?}, retryable={retryable}): {message}")]
    CallFailed {
        message: String,
        retryable: bool,
        status: Option<u16>,
    },

    /// The configured per-call timeout elapsed before a response arrived.
    #[error("vendor call timed out")]
    Timeout,

    /// The requested vendor identifier has no registered adapter for the
    /// requested capability.
    #[error("unknown vendor or capability: {0}")]
    UnknownVendor(String),
}

impl VendorError {
    /// Whether a bounded retry is permitted for this error (§7).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::CallFailed { retryable: true, .. })
    }

    /// The `failure_reason` string recorded on a failed run item.
    #[must_use]
    pub fn failure_reason(&self) -> String {
        match self {
            Self::Timeout => "timeout".to_string(),
            Self::UnknownVendor(v) => format!("unknown_vendor:{v}"),
            Self::CallFailed { message, .. } => message.clone(),
        }
    }
}

/// Core error type for semantic domain errors.
///
/// This is the canonical error type used across the core domain and engine.
/// Adapters (Axum, CLI) map this to their own error types (HTTP status
/// codes, exit codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Vendor adapter call failed.
    #[error(transparent)]
    Vendor(#[from] VendorError),

    /// Validation error (invalid input) — rejects the whole request.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A repository/engine invariant was violated (IntegrityError, §7).
    /// Programmer error; surfaced and the owning run is marked failed.
    #[error("internal error: {0}")]
    Internal(String),
}
