//! Storage error types

use thiserror::Error;

/// Failures the persistence collaborator can report
#[derive(Debug, Error)]
pub enum StorageError {
    /// The entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Conditional write refused: the stored version moved on
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },

    /// The entity already exists
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend failure (lock poisoned, connection lost, ...)
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
