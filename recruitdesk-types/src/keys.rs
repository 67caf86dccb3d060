//! Permission keys.
//!
//! Coarse module keys and granular tab keys live in two disjoint namespaces.
//! They are distinct types so a tab key can never be passed where the ceiling
//! merge expects a module key.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

fn validate(raw: &str) -> Result<(), Error> {
    let ok = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidKey(raw.to_string()))
    }
}

/// Key of a coarse, ceiling-governed feature module (menu or submenu entry).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleKey(String);

impl ModuleKey {
    /// Wraps a key known to be well formed (catalog constants, tests).
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Parses and validates a key coming from outside the process.
    pub fn parse(key: &str) -> Result<Self, Error> {
        validate(key)?;
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Key of a granular candidate-detail tab (directly assigned, deny by default).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabKey(String);

impl TabKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn parse(key: &str) -> Result<Self, Error> {
        validate(key)?;
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Either kind of key, for operations that span both namespaces
/// (delegation checks, the staff denylist).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "namespace", content = "key", rename_all = "snake_case")]
pub enum PermissionKey {
    Module(ModuleKey),
    Tab(TabKey),
}

impl PermissionKey {
    /// The raw key string, without its namespace.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Module(k) => k.as_str(),
            Self::Tab(k) => k.as_str(),
        }
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(k) => write!(f, "module:{k}"),
            Self::Tab(k) => write!(f, "tab:{k}"),
        }
    }
}

impl From<ModuleKey> for PermissionKey {
    fn from(key: ModuleKey) -> Self {
        Self::Module(key)
    }
}

impl From<TabKey> for PermissionKey {
    fn from(key: TabKey) -> Self {
        Self::Tab(key)
    }
}
