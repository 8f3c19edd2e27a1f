//! Error types for the estate catalog.
//!
//! Store failures are propagated unchanged to the caller; nothing in this crate
//! retries on its own. `is_retryable` lets an outer layer decide.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the estate catalog.
#[derive(Debug, Error)]
pub enum EstateError {
    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("Corrupt record {id}: {message}")]
    CorruptRecord { id: String, message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Store is closed")]
    Closed,

    #[error("Background task failed: {message}")]
    TaskFailed { message: String },
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, EstateError>;

impl From<std::io::Error> for EstateError {
    fn from(err: std::io::Error) -> Self {
        EstateError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for EstateError {
    fn from(err: rusqlite::Error) -> Self {
        EstateError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<tokio::task::JoinError> for EstateError {
    fn from(err: tokio::task::JoinError) -> Self {
        EstateError::TaskFailed {
            message: err.to_string(),
        }
    }
}

impl EstateError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        EstateError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Error for a poisoned or otherwise unavailable connection lock.
    pub(crate) fn lock_poisoned() -> Self {
        EstateError::Database {
            message: "Failed to acquire connection lock".to_string(),
            source: None,
        }
    }

    /// HTTP status an outer transport should answer with.
    ///
    /// Absence is not an error in this crate, so there is no 404 mapping here.
    pub fn status_code(&self) -> u16 {
        match self {
            EstateError::Validation { .. } => 400,
            EstateError::Cancelled | EstateError::Closed => 503,
            EstateError::Database { .. } if self.is_retryable() => 503,
            _ => 500,
        }
    }

    /// Check if this error is transient (busy/locked store or cancellation).
    pub fn is_retryable(&self) -> bool {
        match self {
            EstateError::Cancelled => true,
            EstateError::Database {
                source: Some(rusqlite::Error::SqliteFailure(err, _)),
                ..
            } => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}
