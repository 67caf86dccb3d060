//! The persistence contract the access engine consumes.

use crate::catalog::ModuleCatalog;
use crate::error::StoreResult;
use async_trait::async_trait;
use recruitdesk_types::{Generation, ModuleKey, Override, Role, TabKey, UserId};
use std::collections::BTreeMap;

/// Global feature flags as fetched, tagged with the store generation they
/// were read at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalFlagSnapshot {
    pub flags: BTreeMap<ModuleKey, bool>,
    pub generation: Generation,
}

/// Request/response access to the durable permission state.
///
/// Every successful `persist_*` call bumps the store generation and returns
/// the new value. Each persist call is atomic: either every entry in the
/// request is written or none is.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn fetch_global_flags(&self) -> StoreResult<GlobalFlagSnapshot>;

    /// Explicit module assignments for one user. Keys without a row inherit.
    async fn fetch_user_overrides(&self, user_id: UserId) -> StoreResult<BTreeMap<ModuleKey, bool>>;

    async fn fetch_granular_tabs(&self, user_id: UserId) -> StoreResult<BTreeMap<TabKey, bool>>;

    /// The module catalog as served to `role`.
    async fn fetch_module_catalog(&self, role: Role) -> StoreResult<ModuleCatalog>;

    async fn current_generation(&self) -> StoreResult<Generation>;

    async fn persist_global_flag_toggle(&self, key: &ModuleKey, enabled: bool) -> StoreResult<Generation>;

    /// `Override::Set` upserts a row, `Override::Inherit` removes it.
    async fn persist_override_set(
        &self,
        user_id: UserId,
        changes: &BTreeMap<ModuleKey, Override>,
    ) -> StoreResult<Generation>;

    async fn persist_granular_tab_set(
        &self,
        user_id: UserId,
        changes: &BTreeMap<TabKey, bool>,
    ) -> StoreResult<Generation>;
}
