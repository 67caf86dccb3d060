//! In-memory permission store with fault injection.

use crate::catalog::ModuleCatalog;
use crate::error::{StoreError, StoreResult};
use crate::store::{GlobalFlagSnapshot, PermissionStore};
use async_trait::async_trait;
use recruitdesk_types::{Generation, ModuleKey, Override, Role, TabKey, UserId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    GlobalFlags,
    UserOverrides,
    GranularTabs,
    ModuleCatalog,
    Generation,
    PersistGlobalFlag,
    PersistOverrides,
    PersistGranularTabs,
}

#[derive(Debug, Default)]
struct MemoryState {
    flags: BTreeMap<ModuleKey, bool>,
    overrides: HashMap<UserId, BTreeMap<ModuleKey, bool>>,
    tabs: HashMap<UserId, BTreeMap<TabKey, bool>>,
    generation: Generation,
    faults: HashSet<FailPoint>,
}

/// Permission store kept entirely in memory. Intended for tests and for
/// running the engine without a database.
pub struct MemoryPermissionStore {
    state: Mutex<MemoryState>,
    catalog: ModuleCatalog,
}

impl MemoryPermissionStore {
    pub fn new(catalog: ModuleCatalog) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            catalog,
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Storage("memory store lock poisoned".to_string()))
    }

    fn check(state: &MemoryState, point: FailPoint) -> StoreResult<()> {
        if state.faults.contains(&point) {
            Err(StoreError::Unavailable(format!("injected failure at {point:?}")))
        } else {
            Ok(())
        }
    }

    /// Seeds a global flag without bumping the generation.
    pub fn seed_global_flag(&self, key: impl Into<ModuleKey>, enabled: bool) -> StoreResult<()> {
        self.lock()?.flags.insert(key.into(), enabled);
        Ok(())
    }

    /// Seeds a user override without bumping the generation.
    pub fn seed_override(&self, user_id: UserId, key: impl Into<ModuleKey>, enabled: bool) -> StoreResult<()> {
        self.lock()?
            .overrides
            .entry(user_id)
            .or_default()
            .insert(key.into(), enabled);
        Ok(())
    }

    /// Seeds a granular tab assignment without bumping the generation.
    pub fn seed_granular_tab(&self, user_id: UserId, key: impl Into<TabKey>, enabled: bool) -> StoreResult<()> {
        self.lock()?
            .tabs
            .entry(user_id)
            .or_default()
            .insert(key.into(), enabled);
        Ok(())
    }

    /// Makes every subsequent call through `point` fail.
    pub fn fail_on(&self, point: FailPoint) -> StoreResult<()> {
        self.lock()?.faults.insert(point);
        Ok(())
    }

    pub fn clear_faults(&self) -> StoreResult<()> {
        self.lock()?.faults.clear();
        Ok(())
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn fetch_global_flags(&self) -> StoreResult<GlobalFlagSnapshot> {
        let state = self.lock()?;
        Self::check(&state, FailPoint::GlobalFlags)?;
        Ok(GlobalFlagSnapshot {
            flags: state.flags.clone(),
            generation: state.generation,
        })
    }

    async fn fetch_user_overrides(&self, user_id: UserId) -> StoreResult<BTreeMap<ModuleKey, bool>> {
        let state = self.lock()?;
        Self::check(&state, FailPoint::UserOverrides)?;
        Ok(state.overrides.get(&user_id).cloned().unwrap_or_default())
    }

    async fn fetch_granular_tabs(&self, user_id: UserId) -> StoreResult<BTreeMap<TabKey, bool>> {
        let state = self.lock()?;
        Self::check(&state, FailPoint::GranularTabs)?;
        Ok(state.tabs.get(&user_id).cloned().unwrap_or_default())
    }

    async fn fetch_module_catalog(&self, role: Role) -> StoreResult<ModuleCatalog> {
        let state = self.lock()?;
        Self::check(&state, FailPoint::ModuleCatalog)?;
        Ok(self.catalog.for_role(role))
    }

    async fn current_generation(&self) -> StoreResult<Generation> {
        let state = self.lock()?;
        Self::check(&state, FailPoint::Generation)?;
        Ok(state.generation)
    }

    async fn persist_global_flag_toggle(&self, key: &ModuleKey, enabled: bool) -> StoreResult<Generation> {
        let mut state = self.lock()?;
        Self::check(&state, FailPoint::PersistGlobalFlag)?;
        state.flags.insert(key.clone(), enabled);
        state.generation = state.generation.next();
        Ok(state.generation)
    }

    async fn persist_override_set(
        &self,
        user_id: UserId,
        changes: &BTreeMap<ModuleKey, Override>,
    ) -> StoreResult<Generation> {
        let mut state = self.lock()?;
        Self::check(&state, FailPoint::PersistOverrides)?;
        let rows = state.overrides.entry(user_id).or_default();
        for (key, decision) in changes {
            match decision {
                Override::Set(enabled) => {
                    rows.insert(key.clone(), *enabled);
                }
                Override::Inherit => {
                    rows.remove(key);
                }
            }
        }
        state.generation = state.generation.next();
        Ok(state.generation)
    }

    async fn persist_granular_tab_set(
        &self,
        user_id: UserId,
        changes: &BTreeMap<TabKey, bool>,
    ) -> StoreResult<Generation> {
        let mut state = self.lock()?;
        Self::check(&state, FailPoint::PersistGranularTabs)?;
        let rows = state.tabs.entry(user_id).or_default();
        for (key, enabled) in changes {
            rows.insert(key.clone(), *enabled);
        }
        state.generation = state.generation.next();
        Ok(state.generation)
    }
}
