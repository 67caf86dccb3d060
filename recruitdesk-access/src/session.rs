//! Session-scoped permission state.
//!
//! A session fetches its inputs concurrently, resolves once every fetch has
//! completed, and keeps the derived sets (effective permissions, menu, route
//! guard) until the store reports a newer generation or the caller forces a
//! refresh. Any fetch failure fails closed and is reported as a warning; it
//! never prevents the session from starting.

use crate::config::EngineConfig;
use crate::delegation::Grantor;
use crate::error::AccessResult;
use crate::guard::{RouteDecision, RouteGuard};
use crate::menu::{build_menu, MenuNode};
use crate::resolver::{resolve, EffectivePermissionSet};
use crate::sets::{GlobalFlagSet, GranularTabSet, OverrideSet};
use crate::tabs::CandidateTabList;
use recruitdesk_store::{ModuleCatalog, PermissionStore};
use recruitdesk_types::{Generation, ModuleKey, PermissionKey, Role, TabKey, UserAccount, UserId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A non-blocking problem encountered while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "detail", rename_all = "snake_case")]
pub enum ResolutionWarning {
    GlobalFlagsUnavailable(String),
    OverridesUnavailable(String),
    GranularTabsUnavailable(String),
    CatalogUnavailable(String),
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalFlagsUnavailable(e) => write!(f, "feature flags unavailable: {e}"),
            Self::OverridesUnavailable(e) => write!(f, "user permissions unavailable: {e}"),
            Self::GranularTabsUnavailable(e) => write!(f, "tab permissions unavailable: {e}"),
            Self::CatalogUnavailable(e) => write!(f, "module catalog unavailable: {e}"),
        }
    }
}

/// Everything derived from one resolution.
#[derive(Debug, Clone)]
struct Resolved {
    /// `None` when the ceiling could not be fetched; such a session only
    /// re-resolves on an explicit refresh.
    generation: Option<Generation>,
    effective: EffectivePermissionSet,
    catalog: ModuleCatalog,
    menu: Vec<MenuNode>,
    guard: RouteGuard,
    warnings: Vec<ResolutionWarning>,
}

/// Serializable view of a session for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionSnapshot {
    pub user_id: UserId,
    pub role: Role,
    pub generation: Option<Generation>,
    pub modules: BTreeMap<ModuleKey, bool>,
    pub tabs: BTreeMap<TabKey, bool>,
    pub menu: Vec<MenuNode>,
    pub warnings: Vec<ResolutionWarning>,
}

impl PermissionSnapshot {
    pub fn to_json(&self) -> AccessResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub struct PermissionSession {
    account: UserAccount,
    store: Arc<dyn PermissionStore>,
    config: Arc<EngineConfig>,
    resolved: Resolved,
}

impl PermissionSession {
    /// Opens a session for `account`. Never fails: unavailable inputs are
    /// treated as closed and listed in `warnings()`.
    pub async fn start(
        store: Arc<dyn PermissionStore>,
        config: Arc<EngineConfig>,
        account: UserAccount,
    ) -> Self {
        let resolved = Self::load(store.as_ref(), &config, &account).await;
        info!(
            user_id = %account.id,
            role = %account.role,
            generation = ?resolved.generation,
            granted = resolved.effective.granted_modules().count(),
            warnings = resolved.warnings.len(),
            "Permission session started"
        );
        Self {
            account,
            store,
            config,
            resolved,
        }
    }

    async fn load(store: &dyn PermissionStore, config: &EngineConfig, account: &UserAccount) -> Resolved {
        let role = account.role;
        let user_id = account.id;

        let (flags, overrides, tabs, catalog) = tokio::join!(
            store.fetch_global_flags(),
            async {
                match role {
                    Role::Staff => store.fetch_user_overrides(user_id).await.map(Some),
                    Role::Admin | Role::SuperAdmin => Ok(None),
                }
            },
            async {
                match role {
                    Role::SuperAdmin => Ok(None),
                    Role::Admin | Role::Staff => store.fetch_granular_tabs(user_id).await.map(Some),
                }
            },
            store.fetch_module_catalog(role),
        );

        let mut warnings = Vec::new();

        let catalog = catalog.unwrap_or_else(|e| {
            warn!(user_id = %user_id, error = %e, "Module catalog fetch failed");
            warnings.push(ResolutionWarning::CatalogUnavailable(e.to_string()));
            ModuleCatalog::empty()
        });

        let (ceiling, generation) = match flags {
            Ok(snapshot) => {
                let ceiling = GlobalFlagSet::from(snapshot);
                let generation = ceiling.generation();
                (ceiling, Some(generation))
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Global flag fetch failed, failing closed");
                warnings.push(ResolutionWarning::GlobalFlagsUnavailable(e.to_string()));
                (GlobalFlagSet::closed(), None)
            }
        };

        // Without its overrides a staff member could see modules an admin
        // switched off, so the whole coarse half closes.
        let (ceiling, overrides, generation) = match overrides {
            Ok(rows) => (
                ceiling,
                rows.map(OverrideSet::from_stored).unwrap_or_default(),
                generation,
            ),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Override fetch failed, failing closed");
                warnings.push(ResolutionWarning::OverridesUnavailable(e.to_string()));
                (GlobalFlagSet::closed(), OverrideSet::new(), None)
            }
        };

        let tabs = match tabs {
            Ok(rows) => rows.map(GranularTabSet::new).unwrap_or_default(),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Granular tab fetch failed, failing closed");
                warnings.push(ResolutionWarning::GranularTabsUnavailable(e.to_string()));
                GranularTabSet::default()
            }
        };

        let effective = resolve(role, &ceiling, &overrides, &tabs, &catalog);
        let menu = build_menu(&catalog, &effective);
        let guard = RouteGuard::new(role, &menu, config);

        Resolved {
            generation,
            effective,
            catalog,
            menu,
            guard,
            warnings,
        }
    }

    /// Forces a re-fetch and re-resolution.
    pub async fn refresh(&mut self) {
        self.resolved = Self::load(self.store.as_ref(), &self.config, &self.account).await;
        info!(
            user_id = %self.account.id,
            generation = ?self.resolved.generation,
            warnings = self.resolved.warnings.len(),
            "Permissions refreshed"
        );
    }

    /// Re-resolves if the store has moved past the resolved generation.
    /// Returns true if a refresh happened. If the generation cannot be read,
    /// the last resolved permissions stay in force.
    pub async fn ensure_fresh(&mut self) -> bool {
        let Some(resolved_at) = self.resolved.generation else {
            return false;
        };
        match self.store.current_generation().await {
            Ok(current) if resolved_at.is_older_than(current) => {
                debug!(
                    user_id = %self.account.id,
                    resolved = %resolved_at,
                    current = %current,
                    "Resolved permissions are stale"
                );
                self.refresh().await;
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(user_id = %self.account.id, error = %e, "Generation check failed");
                false
            }
        }
    }

    /// Route change: brings permissions up to date, then guards `route`.
    pub async fn navigate(&mut self, route: &str) -> RouteDecision {
        self.ensure_fresh().await;
        self.require_route(route)
    }

    /// Ends the session; every derived set is dropped.
    pub fn end(self) {
        info!(user_id = %self.account.id, "Permission session ended");
    }

    pub fn account(&self) -> &UserAccount {
        &self.account
    }

    pub fn user_id(&self) -> UserId {
        self.account.id
    }

    pub fn role(&self) -> Role {
        self.account.role
    }

    pub fn generation(&self) -> Option<Generation> {
        self.resolved.generation
    }

    pub fn warnings(&self) -> &[ResolutionWarning] {
        &self.resolved.warnings
    }

    pub fn effective(&self) -> &EffectivePermissionSet {
        &self.resolved.effective
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.resolved.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn can(&self, key: &ModuleKey) -> bool {
        self.resolved.effective.can(key)
    }

    pub fn can_any(&self, keys: &[ModuleKey]) -> bool {
        self.resolved.effective.can_any(keys)
    }

    pub fn can_all(&self, keys: &[ModuleKey]) -> bool {
        self.resolved.effective.can_all(keys)
    }

    pub fn can_tab(&self, key: &TabKey) -> bool {
        self.resolved.effective.can_tab(key)
    }

    pub fn menu(&self) -> &[MenuNode] {
        &self.resolved.menu
    }

    pub fn build_menu(&self) -> Vec<MenuNode> {
        self.resolved.menu.clone()
    }

    pub fn build_candidate_tabs(&self, previous: Option<&TabKey>) -> CandidateTabList {
        CandidateTabList::build(&self.resolved.catalog, &self.resolved.effective, previous)
    }

    pub fn can_access_route(&self, route: &str) -> bool {
        self.resolved.guard.can_access_route(route)
    }

    pub fn require_route(&self, route: &str) -> RouteDecision {
        self.resolved.guard.require_route(route)
    }

    /// This session's user acting as a grantor.
    pub fn grantor(&self) -> Grantor<'_> {
        Grantor {
            account: &self.account,
            effective: &self.resolved.effective,
            catalog: &self.resolved.catalog,
        }
    }

    pub fn can_grant(&self, key: &PermissionKey) -> bool {
        self.grantor().can_grant(key)
    }

    pub fn snapshot(&self) -> PermissionSnapshot {
        PermissionSnapshot {
            user_id: self.account.id,
            role: self.account.role,
            generation: self.resolved.generation,
            modules: self.resolved.effective.modules().clone(),
            tabs: self.resolved.effective.tabs().clone(),
            menu: self.resolved.menu.clone(),
            warnings: self.resolved.warnings.clone(),
        }
    }
}

impl fmt::Debug for PermissionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionSession")
            .field("account", &self.account)
            .field("generation", &self.resolved.generation)
            .field("warnings", &self.resolved.warnings)
            .finish_non_exhaustive()
    }
}
