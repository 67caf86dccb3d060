//! Candidate-detail tab assembly and selection.

use crate::resolver::EffectivePermissionSet;
use recruitdesk_store::ModuleCatalog;
use recruitdesk_types::TabKey;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabNode {
    pub key: TabKey,
    pub display_name: String,
    pub icon: Option<String>,
}

/// Visible candidate tabs in catalog order.
pub fn build_candidate_tabs(catalog: &ModuleCatalog, effective: &EffectivePermissionSet) -> Vec<TabNode> {
    catalog
        .tabs()
        .filter_map(|def| {
            let key = def.tab_key()?;
            effective.can_tab(&key).then(|| TabNode {
                key,
                display_name: def.display_name.clone(),
                icon: def.icon.clone(),
            })
        })
        .collect()
}

/// The selected tab, or an explicit empty state when nothing is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "tab", rename_all = "snake_case")]
pub enum TabSelection {
    Active(TabKey),
    Empty,
}

impl TabSelection {
    pub fn active(&self) -> Option<&TabKey> {
        match self {
            Self::Active(key) => Some(key),
            Self::Empty => None,
        }
    }
}

/// Keeps `previous` when it is still visible, otherwise falls back to the
/// first visible tab.
pub fn select_tab(tabs: &[TabNode], previous: Option<&TabKey>) -> TabSelection {
    if let Some(prev) = previous {
        if tabs.iter().any(|t| &t.key == prev) {
            return TabSelection::Active(prev.clone());
        }
    }
    match tabs.first() {
        Some(first) => TabSelection::Active(first.key.clone()),
        None => TabSelection::Empty,
    }
}

/// Visible tabs together with the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateTabList {
    tabs: Vec<TabNode>,
    selection: TabSelection,
}

impl CandidateTabList {
    pub fn build(
        catalog: &ModuleCatalog,
        effective: &EffectivePermissionSet,
        previous: Option<&TabKey>,
    ) -> Self {
        let tabs = build_candidate_tabs(catalog, effective);
        let selection = select_tab(&tabs, previous);
        Self { tabs, selection }
    }

    pub fn tabs(&self) -> &[TabNode] {
        &self.tabs
    }

    pub fn selection(&self) -> &TabSelection {
        &self.selection
    }

    pub fn active(&self) -> Option<&TabKey> {
        self.selection.active()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Selects `key` if it is visible. Returns false and keeps the current
    /// selection otherwise.
    pub fn select(&mut self, key: &TabKey) -> bool {
        if self.tabs.iter().any(|t| &t.key == key) {
            self.selection = TabSelection::Active(key.clone());
            true
        } else {
            false
        }
    }
}
