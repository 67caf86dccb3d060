//! Permission resolver.
//!
//! Combines a role, the global ceiling and a user's overrides into the
//! session's effective permissions. Pure and idempotent: the same inputs
//! always produce the same set, and nothing is written anywhere.
//!
//! Coarse keys (ceiling merge):
//! - `super_admin`, `admin`: the ceiling, unmodified. Overrides are ignored.
//! - `staff`: the ceiling, with each explicit override applied only where the
//!   ceiling is open. A closed ceiling always wins.
//!
//! Granular tab keys (direct assignment):
//! - `super_admin`: every catalog tab.
//! - everyone else: only tabs explicitly switched on.

use crate::sets::{GlobalFlagSet, GranularTabSet, OverrideSet};
use recruitdesk_store::ModuleCatalog;
use recruitdesk_types::{Generation, ModuleKey, Role, TabKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// Resolves coarse module keys.
pub fn resolve_modules(
    role: Role,
    flags: &GlobalFlagSet,
    overrides: &OverrideSet,
) -> BTreeMap<ModuleKey, bool> {
    let mut effective = flags.flags().clone();
    match role {
        Role::SuperAdmin | Role::Admin => {}
        Role::Staff => {
            for (key, decision) in overrides.iter() {
                let open = flags.is_open(key);
                effective.insert(key.clone(), open && decision.apply(open));
            }
        }
    }
    effective
}

/// Resolves granular tab keys against the catalog's tab list.
pub fn resolve_tabs(
    role: Role,
    granted: &GranularTabSet,
    catalog: &ModuleCatalog,
) -> BTreeMap<TabKey, bool> {
    catalog
        .tab_keys()
        .into_iter()
        .map(|key| {
            let allowed = match role {
                Role::SuperAdmin => true,
                Role::Admin | Role::Staff => granted.is_granted(&key),
            };
            (key, allowed)
        })
        .collect()
}

/// Resolves both halves into one effective set.
pub fn resolve(
    role: Role,
    flags: &GlobalFlagSet,
    overrides: &OverrideSet,
    tabs: &GranularTabSet,
    catalog: &ModuleCatalog,
) -> EffectivePermissionSet {
    EffectivePermissionSet {
        role,
        generation: flags.generation(),
        modules: resolve_modules(role, flags, overrides),
        tabs: resolve_tabs(role, tabs, catalog),
    }
}

/// Session-scoped, derived access map. Never persisted.
///
/// Lookups of keys the resolver never saw are denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectivePermissionSet {
    role: Role,
    generation: Generation,
    modules: BTreeMap<ModuleKey, bool>,
    tabs: BTreeMap<TabKey, bool>,
}

impl EffectivePermissionSet {
    /// A set that grants nothing.
    pub fn denied(role: Role) -> Self {
        Self {
            role,
            generation: Generation::ZERO,
            modules: BTreeMap::new(),
            tabs: BTreeMap::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Generation of the ceiling snapshot this set was resolved from.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn can(&self, key: &ModuleKey) -> bool {
        self.modules.get(key).copied().unwrap_or(false)
    }

    /// False for an empty list.
    pub fn can_any(&self, keys: &[ModuleKey]) -> bool {
        keys.iter().any(|k| self.can(k))
    }

    /// True for an empty list.
    pub fn can_all(&self, keys: &[ModuleKey]) -> bool {
        keys.iter().all(|k| self.can(k))
    }

    pub fn can_tab(&self, key: &TabKey) -> bool {
        self.tabs.get(key).copied().unwrap_or(false)
    }

    pub fn modules(&self) -> &BTreeMap<ModuleKey, bool> {
        &self.modules
    }

    pub fn tabs(&self) -> &BTreeMap<TabKey, bool> {
        &self.tabs
    }

    /// Granted module keys, in key order.
    pub fn granted_modules(&self) -> impl Iterator<Item = &ModuleKey> {
        self.modules.iter().filter(|(_, v)| **v).map(|(k, _)| k)
    }
}
