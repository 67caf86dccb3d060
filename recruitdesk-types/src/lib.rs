//! Core type definitions for RecruitDesk.
//!
//! This crate defines the small, closed vocabulary shared by the permission
//! store and the access engine:
//! - User identifiers (UUID v7) and account descriptors
//! - The three-tier `Role` with its authority order
//! - Coarse module keys and granular tab keys (two disjoint namespaces)
//! - The `Override` sum type for per-user module assignments
//! - The write `Generation` counter used for staleness checks
//!
//! Candidate records, documents, payments and the rest of the consultancy's
//! CRUD surface live elsewhere; nothing here knows about them.

mod account;
mod generation;
mod ids;
mod keys;
mod overrides;
mod role;

pub use account::UserAccount;
pub use generation::Generation;
pub use ids::UserId;
pub use keys::{ModuleKey, PermissionKey, TabKey};
pub use overrides::Override;
pub use role::Role;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("invalid permission key: {0:?}")]
    InvalidKey(String),
}
