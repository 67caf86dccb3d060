//! Permission administration: the only write path of the engine.
//!
//! Every operation re-checks the actor's authority against freshly resolved
//! permissions before persisting, whatever controls the UI rendered.

use crate::delegation::DelegationPolicy;
use crate::error::{AccessError, AccessResult};
use crate::session::PermissionSession;
use recruitdesk_store::PermissionStore;
use recruitdesk_types::{Generation, ModuleKey, Override, Role, TabKey, UserAccount};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

pub struct PermissionAdmin {
    store: Arc<dyn PermissionStore>,
    policy: DelegationPolicy,
}

impl PermissionAdmin {
    pub fn new(store: Arc<dyn PermissionStore>, policy: DelegationPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &DelegationPolicy {
        &self.policy
    }

    /// Opens or closes a module in the global ceiling. `super_admin` only.
    /// The actor's own session is re-resolved afterwards.
    pub async fn toggle_global_flag(
        &self,
        actor: &mut PermissionSession,
        key: &ModuleKey,
        enabled: bool,
    ) -> AccessResult<Generation> {
        if actor.role() != Role::SuperAdmin {
            warn!(user_id = %actor.user_id(), module = %key, "Non-super-admin flag toggle rejected");
            return Err(AccessError::NotAuthorized(
                "only super_admin may change feature flags".to_string(),
            ));
        }
        if !actor.catalog().contains_module(key) {
            return Err(AccessError::UnknownKey(key.to_string()));
        }

        let generation = self.store.persist_global_flag_toggle(key, enabled).await?;
        info!(user_id = %actor.user_id(), module = %key, enabled, %generation, "Global flag toggled");
        actor.refresh().await;
        Ok(generation)
    }

    /// Saves module overrides for a staff account. The request is validated
    /// in full first and persisted in one atomic call.
    pub async fn save_overrides(
        &self,
        grantor: &mut PermissionSession,
        target: &UserAccount,
        changes: &BTreeMap<ModuleKey, Override>,
    ) -> AccessResult<Generation> {
        grantor.ensure_fresh().await;
        self.policy
            .check_override_request(&grantor.grantor(), target, changes)?;
        if changes.is_empty() {
            return Ok(self.store.current_generation().await?);
        }

        let generation = self.store.persist_override_set(target.id, changes).await?;
        info!(
            grantor = %grantor.user_id(),
            target = %target.id,
            changes = changes.len(),
            %generation,
            "Overrides saved"
        );
        Ok(generation)
    }

    /// Saves granular tab assignments for a staff or admin account.
    pub async fn save_granular_tabs(
        &self,
        grantor: &mut PermissionSession,
        target: &UserAccount,
        changes: &BTreeMap<TabKey, bool>,
    ) -> AccessResult<Generation> {
        grantor.ensure_fresh().await;
        self.policy.check_tab_request(&grantor.grantor(), target, changes)?;
        if changes.is_empty() {
            return Ok(self.store.current_generation().await?);
        }

        let generation = self.store.persist_granular_tab_set(target.id, changes).await?;
        info!(
            grantor = %grantor.user_id(),
            target = %target.id,
            changes = changes.len(),
            %generation,
            "Granular tabs saved"
        );
        Ok(generation)
    }

    /// Module keys to render override controls for when editing `target`.
    pub fn grantable_modules(&self, grantor: &PermissionSession, target: Role) -> Vec<ModuleKey> {
        self.policy.grantable_modules(&grantor.grantor(), target)
    }

    /// Tab keys to render controls for when editing `target`.
    pub fn grantable_tabs(&self, grantor: &PermissionSession, target: Role) -> Vec<TabKey> {
        self.policy.grantable_tabs(&grantor.grantor(), target)
    }
}
