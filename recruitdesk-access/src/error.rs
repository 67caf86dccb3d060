//! Error types for the access engine.
//!
//! Only write paths return these. Read-side checks degrade to "deny".

use recruitdesk_store::StoreError;
use thiserror::Error;

/// Result type for access-engine operations.
pub type AccessResult<T> = Result<T, AccessError>;

#[derive(Debug, Error)]
pub enum AccessError {
    /// A grant or revoke the actor may not perform. Nothing was written.
    #[error("invalid grant of '{key}': {reason}")]
    InvalidGrant { key: String, reason: String },

    /// The actor's role does not allow the operation at all.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// The key is not in the actor's module catalog.
    #[error("unknown permission key: {0}")]
    UnknownKey(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
