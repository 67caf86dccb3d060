//! Static module catalog.
//!
//! The catalog is the universe of assignable permissions and the shape of the
//! menu and candidate-tab views. It is read-only at runtime: built in, or
//! loaded once from a TOML file of `[[module]]` entries.

use crate::error::{StoreError, StoreResult};
use recruitdesk_types::{ModuleKey, Role, TabKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// What a catalog entry renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Top-level menu entry (coarse key).
    Menu,
    /// Child of a menu entry (coarse key).
    Submenu,
    /// Candidate-detail tab (granular key).
    Tab,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub key: String,
    pub display_name: String,
    pub kind: ModuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Lowest role the catalog serves this entry to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_role: Option<Role>,
}

impl ModuleDefinition {
    pub fn menu(key: &str, display_name: &str, route: Option<&str>, icon: &str) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            kind: ModuleKind::Menu,
            parent_key: None,
            route: route.map(str::to_string),
            icon: Some(icon.to_string()),
            required_role: None,
        }
    }

    pub fn submenu(key: &str, display_name: &str, parent: &str, route: &str) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            kind: ModuleKind::Submenu,
            parent_key: Some(parent.to_string()),
            route: Some(route.to_string()),
            icon: None,
            required_role: None,
        }
    }

    pub fn tab(key: &str, display_name: &str, icon: &str) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            kind: ModuleKind::Tab,
            parent_key: None,
            route: None,
            icon: Some(icon.to_string()),
            required_role: None,
        }
    }

    #[must_use]
    pub fn with_required_role(mut self, role: Role) -> Self {
        self.required_role = Some(role);
        self
    }

    /// The coarse key of a menu or submenu entry.
    pub fn module_key(&self) -> Option<ModuleKey> {
        match self.kind {
            ModuleKind::Menu | ModuleKind::Submenu => Some(ModuleKey::new(self.key.as_str())),
            ModuleKind::Tab => None,
        }
    }

    /// The granular key of a tab entry.
    pub fn tab_key(&self) -> Option<TabKey> {
        match self.kind {
            ModuleKind::Tab => Some(TabKey::new(self.key.as_str())),
            ModuleKind::Menu | ModuleKind::Submenu => None,
        }
    }

    fn served_to(&self, role: Role) -> bool {
        self.required_role.is_none_or(|required| role >= required)
    }
}

/// Validated, ordered list of module definitions. Catalog order is priority
/// order for both menus and tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleCatalog {
    definitions: Vec<ModuleDefinition>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "module")]
    modules: Vec<ModuleDefinition>,
}

impl ModuleCatalog {
    /// Validates and wraps a list of definitions.
    pub fn new(definitions: Vec<ModuleDefinition>) -> StoreResult<Self> {
        let mut seen: HashMap<&str, ModuleKind> = HashMap::new();
        for def in &definitions {
            if ModuleKey::parse(&def.key).is_err() {
                return Err(StoreError::Catalog(format!("malformed key {:?}", def.key)));
            }
            if let Some(previous) = seen.get(def.key.as_str()) {
                let clash = (*previous == ModuleKind::Tab) != (def.kind == ModuleKind::Tab);
                return Err(StoreError::Catalog(if clash {
                    format!("key '{}' used as both module and tab", def.key)
                } else {
                    format!("duplicate key '{}'", def.key)
                }));
            }
            match (def.kind, def.parent_key.as_deref()) {
                (ModuleKind::Submenu, None) => {
                    return Err(StoreError::Catalog(format!(
                        "submenu '{}' has no parent",
                        def.key
                    )));
                }
                (ModuleKind::Submenu, Some(parent)) => {
                    if seen.get(parent) != Some(&ModuleKind::Menu) {
                        return Err(StoreError::Catalog(format!(
                            "submenu '{}' must follow its menu parent '{}'",
                            def.key, parent
                        )));
                    }
                }
                (_, Some(_)) => {
                    return Err(StoreError::Catalog(format!(
                        "only submenus may declare a parent ('{}')",
                        def.key
                    )));
                }
                (_, None) => {}
            }
            if def.kind == ModuleKind::Tab && def.route.is_some() {
                return Err(StoreError::Catalog(format!("tab '{}' cannot carry a route", def.key)));
            }
            seen.insert(def.key.as_str(), def.kind);
        }
        Ok(Self { definitions })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a catalog from TOML text.
    pub fn from_toml_str(contents: &str) -> StoreResult<Self> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::new(file.modules)
    }

    /// Loads a catalog from a TOML file.
    pub fn load_from(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), entries = catalog.len(), "Loaded module catalog");
        Ok(catalog)
    }

    /// The consultancy's default catalog.
    pub fn builtin() -> Self {
        use ModuleDefinition as D;
        let admin = Role::Admin;
        Self {
            definitions: vec![
                D::menu("dashboard", "Dashboard", Some("/dashboard"), "home"),
                D::menu("candidates", "Candidates", Some("/candidates"), "users"),
                D::menu("documents", "Documents", Some("/documents"), "folder"),
                D::menu("finance", "Finance", Some("/finance"), "wallet"),
                D::submenu("payments", "Payments", "finance", "/finance/payments"),
                D::submenu("expenses", "Expenses", "finance", "/finance/expenses"),
                D::menu("processing", "Processing", None, "passport"),
                D::submenu("visa", "Visa", "processing", "/processing/visa"),
                D::submenu("medical", "Medical", "processing", "/processing/medical"),
                D::submenu("travel", "Travel", "processing", "/processing/travel"),
                D::menu("job_orders", "Job Orders", Some("/job-orders"), "briefcase"),
                D::menu("messaging", "Messaging", Some("/messaging"), "message"),
                D::menu("reports", "Reports", Some("/reports"), "chart"),
                D::menu("recycle_bin", "Recycle Bin", Some("/recycle-bin"), "trash"),
                D::menu("administration", "Administration", None, "shield")
                    .with_required_role(admin),
                D::submenu("users", "Users", "administration", "/admin/users")
                    .with_required_role(admin),
                D::submenu("permissions", "Permissions", "administration", "/admin/permissions")
                    .with_required_role(admin),
                D::submenu("bulk_import", "Bulk Import", "administration", "/admin/bulk-import")
                    .with_required_role(admin),
                D::submenu("feature_flags", "Feature Flags", "administration", "/admin/feature-flags")
                    .with_required_role(Role::SuperAdmin),
                D::tab("candidate_profile", "Profile", "id-card"),
                D::tab("candidate_documents", "Documents", "folder"),
                D::tab("candidate_finance", "Finance", "wallet"),
                D::tab("candidate_visa", "Visa", "passport"),
                D::tab("candidate_medical", "Medical", "heart"),
                D::tab("candidate_travel", "Travel", "plane"),
                D::tab("candidate_job_orders", "Job Orders", "briefcase"),
                D::tab("candidate_messages", "Messages", "message"),
                D::tab("candidate_history", "History", "clock"),
            ],
        }
    }

    pub fn definitions(&self) -> &[ModuleDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ModuleDefinition> {
        self.definitions.iter().find(|d| d.key == key)
    }

    /// Top-level menu entries in catalog order.
    pub fn menus(&self) -> impl Iterator<Item = &ModuleDefinition> {
        self.definitions.iter().filter(|d| d.kind == ModuleKind::Menu)
    }

    /// Submenu entries of `parent` in catalog order.
    pub fn submenus_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a ModuleDefinition> {
        self.definitions
            .iter()
            .filter(move |d| d.kind == ModuleKind::Submenu && d.parent_key.as_deref() == Some(parent))
    }

    /// Candidate tab entries in catalog order.
    pub fn tabs(&self) -> impl Iterator<Item = &ModuleDefinition> {
        self.definitions.iter().filter(|d| d.kind == ModuleKind::Tab)
    }

    /// Every coarse key (menus and submenus).
    pub fn module_keys(&self) -> Vec<ModuleKey> {
        self.definitions.iter().filter_map(ModuleDefinition::module_key).collect()
    }

    /// Every granular tab key.
    pub fn tab_keys(&self) -> Vec<TabKey> {
        self.definitions.iter().filter_map(ModuleDefinition::tab_key).collect()
    }

    pub fn contains_module(&self, key: &ModuleKey) -> bool {
        self.definitions
            .iter()
            .any(|d| d.kind != ModuleKind::Tab && d.key == key.as_str())
    }

    pub fn contains_tab(&self, key: &TabKey) -> bool {
        self.definitions
            .iter()
            .any(|d| d.kind == ModuleKind::Tab && d.key == key.as_str())
    }

    /// The catalog as served to `role`: entries above the role are removed,
    /// along with submenus whose parent was removed.
    pub fn for_role(&self, role: Role) -> ModuleCatalog {
        let served_menus: Vec<&str> = self
            .menus()
            .filter(|d| d.served_to(role))
            .map(|d| d.key.as_str())
            .collect();
        let definitions = self
            .definitions
            .iter()
            .filter(|d| d.served_to(role))
            .filter(|d| match (d.kind, d.parent_key.as_deref()) {
                (ModuleKind::Submenu, Some(parent)) => served_menus.contains(&parent),
                _ => true,
            })
            .cloned()
            .collect();
        ModuleCatalog { definitions }
    }
}
