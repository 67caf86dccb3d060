//! Error types for the permission store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Storage error (locking, connection state).
    #[error("storage error: {0}")]
    Storage(String),

    /// The backing store could not be reached for a fetch.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The module catalog is malformed.
    #[error("invalid module catalog: {0}")]
    Catalog(String),

    /// Catalog file could not be parsed.
    #[error("catalog parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
