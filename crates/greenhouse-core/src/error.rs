//! Shared error type across greenhouse crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Requested entity does not exist.
    NotFound,
    /// Backing store unreachable or transaction could not be opened.
    StorageUnavailable,
    /// Concurrent conflicting transaction; the caller may retry.
    TransactionConflict,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::StorageUnavailable => "STORAGE_UNAVAILABLE",
            ClientCode::TransactionConflict => "TRANSACTION_CONFLICT",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, ClientCode::StorageUnavailable | ClientCode::TransactionConflict)
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GreenhouseError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum GreenhouseError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("transaction conflict: {0}")]
    TransactionConflict(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl GreenhouseError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            GreenhouseError::BadRequest(_) => ClientCode::BadRequest,
            GreenhouseError::NotFound(_) => ClientCode::NotFound,
            GreenhouseError::StorageUnavailable(_) => ClientCode::StorageUnavailable,
            GreenhouseError::TransactionConflict(_) => ClientCode::TransactionConflict,
            GreenhouseError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            GreenhouseError::Internal(_) => ClientCode::Internal,
        }
    }
}
