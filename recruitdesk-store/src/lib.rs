//! Permission persistence and module catalog for RecruitDesk.
//!
//! This crate is the durable side of the permission engine:
//! - `ModuleCatalog`: the static, validated list of menus, submenus and
//!   candidate tabs, built in or loaded from TOML
//! - `PermissionStore`: the async request/response contract for global
//!   flags, per-user overrides and granular tab assignments
//! - `SqlitePermissionStore`: the on-disk implementation
//! - `MemoryPermissionStore`: an in-memory implementation with fault injection
//!
//! Every write bumps a single store-wide `Generation`, which sessions use to
//! detect that their resolved permissions are stale.

mod catalog;
mod error;
mod memory;
mod sqlite;
mod store;

pub use catalog::{ModuleCatalog, ModuleDefinition, ModuleKind};
pub use error::{StoreError, StoreResult};
pub use memory::{FailPoint, MemoryPermissionStore};
pub use sqlite::SqlitePermissionStore;
pub use store::{GlobalFlagSnapshot, PermissionStore};
