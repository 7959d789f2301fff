//! Error types for the key-value storage boundary.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by key-value store implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A read from the backing store failed.
    #[error("storage read error: {0}")]
    Read(String),

    /// A write to the backing store failed.
    #[error("storage write error: {0}")]
    Write(String),

    /// A removal from the backing store failed.
    #[error("storage remove error: {0}")]
    Remove(String),

    /// The backing store is unavailable (I/O failure, poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
