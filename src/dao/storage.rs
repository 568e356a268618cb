use std::error::Error;

use thiserror::Error;
use uuid::Uuid;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend cannot be reached or failed an I/O operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure.
        message: String,
        /// Backend-specific cause.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The conditional write found a different version than expected.
    #[error("version conflict on session `{id}`: expected {expected}, found {actual}")]
    Conflict {
        /// Session whose write was rejected.
        id: Uuid,
        /// Version the writer read before computing its update.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },
    /// A document required by the operation does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing document.
        what: String,
    },
    /// Create refused because a document with this id already exists.
    #[error("session `{id}` already exists")]
    AlreadyExists {
        /// The colliding id.
        id: Uuid,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
