//! Engine configuration. Reads an `access.toml` file and falls back to
//! defaults when the file is missing or unreadable.

use crate::delegation::DelegationPolicy;
use crate::error::{AccessError, AccessResult};
use recruitdesk_store::ModuleCatalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_LOGIN_ROUTE: &str = "/login";
pub const DEFAULT_ROOT_ROUTE: &str = "/";

/// Keys that are never offered to a staff target, whatever the grantor holds.
pub const DEFAULT_STAFF_DENIED_KEYS: &[&str] = &[
    "administration",
    "users",
    "permissions",
    "feature_flags",
    "bulk_import",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Always reachable, even with an empty permission set.
    pub login_route: String,
    /// Always reachable; denied routes redirect here.
    pub root_route: String,
    pub staff_denied_keys: Vec<String>,
    /// TOML module catalog. The built-in catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            root_route: DEFAULT_ROOT_ROUTE.to_string(),
            staff_denied_keys: DEFAULT_STAFF_DENIED_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            catalog_path: None,
        }
    }
}

/// Raw TOML structure matching the access.toml format.
#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    access: EngineConfig,
}

impl EngineConfig {
    /// Loads configuration from an explicit path.
    /// Falls back to defaults with a warning on read or parse errors.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No access config found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded access config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse access config {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read access config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(contents: &str) -> AccessResult<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| AccessError::Config(e.to_string()))?;
        let config = file.access;
        if !config.login_route.starts_with('/') || !config.root_route.starts_with('/') {
            return Err(AccessError::Config(
                "login_route and root_route must be absolute".to_string(),
            ));
        }
        Ok(config)
    }

    /// The module catalog this configuration points at.
    pub fn load_catalog(&self) -> AccessResult<ModuleCatalog> {
        match &self.catalog_path {
            Some(path) => Ok(ModuleCatalog::load_from(path)?),
            None => Ok(ModuleCatalog::builtin()),
        }
    }

    pub fn delegation_policy(&self) -> DelegationPolicy {
        DelegationPolicy::new(self.staff_denied_keys.iter().cloned())
    }
}
