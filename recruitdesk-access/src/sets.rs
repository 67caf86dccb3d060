//! Resolver inputs: the fetched global ceiling, a user's overrides and a
//! user's granular tab assignments.

use recruitdesk_store::GlobalFlagSnapshot;
use recruitdesk_types::{Generation, ModuleKey, Override, TabKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The global feature-flag ceiling as one versioned snapshot. Keys missing
/// from the snapshot are closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalFlagSet {
    flags: BTreeMap<ModuleKey, bool>,
    generation: Generation,
}

impl GlobalFlagSet {
    pub fn new(flags: BTreeMap<ModuleKey, bool>, generation: Generation) -> Self {
        Self { flags, generation }
    }

    /// A ceiling with every key closed, used when the flag fetch fails.
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn is_open(&self, key: &ModuleKey) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    pub fn flags(&self) -> &BTreeMap<ModuleKey, bool> {
        &self.flags
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl From<GlobalFlagSnapshot> for GlobalFlagSet {
    fn from(snapshot: GlobalFlagSnapshot) -> Self {
        Self::new(snapshot.flags, snapshot.generation)
    }
}

impl FromIterator<(ModuleKey, bool)> for GlobalFlagSet {
    fn from_iter<I: IntoIterator<Item = (ModuleKey, bool)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect(), Generation::ZERO)
    }
}

/// One user's loaded module overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSet {
    entries: BTreeMap<ModuleKey, Override>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from stored rows; every row is an explicit assignment.
    pub fn from_stored(rows: BTreeMap<ModuleKey, bool>) -> Self {
        Self {
            entries: rows.into_iter().map(|(k, v)| (k, Override::Set(v))).collect(),
        }
    }

    pub fn get(&self, key: &ModuleKey) -> Override {
        self.entries.get(key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: ModuleKey, decision: Override) {
        match decision {
            Override::Inherit => {
                self.entries.remove(&key);
            }
            Override::Set(_) => {
                self.entries.insert(key, decision);
            }
        }
    }

    /// Explicit assignments only.
    pub fn iter(&self) -> impl Iterator<Item = (&ModuleKey, Override)> {
        self.entries
            .iter()
            .filter(|(_, o)| o.value().is_some())
            .map(|(k, o)| (k, *o))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ModuleKey, bool)> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = (ModuleKey, bool)>>(iter: I) -> Self {
        Self::from_stored(iter.into_iter().collect())
    }
}

/// One user's granular tab assignments. Absent keys are denied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranularTabSet {
    tabs: BTreeMap<TabKey, bool>,
}

impl GranularTabSet {
    pub fn new(tabs: BTreeMap<TabKey, bool>) -> Self {
        Self { tabs }
    }

    pub fn is_granted(&self, key: &TabKey) -> bool {
        self.tabs.get(key).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

impl FromIterator<(TabKey, bool)> for GranularTabSet {
    fn from_iter<I: IntoIterator<Item = (TabKey, bool)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
