//! Menu assembly and expansion state.

use crate::resolver::EffectivePermissionSet;
use recruitdesk_store::{ModuleCatalog, ModuleDefinition};
use recruitdesk_types::ModuleKey;
use serde::Serialize;
use std::collections::BTreeSet;

/// A visible menu or submenu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub key: ModuleKey,
    pub display_name: String,
    pub route: Option<String>,
    pub icon: Option<String>,
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    fn from_definition(key: ModuleKey, def: &ModuleDefinition, children: Vec<MenuNode>) -> Self {
        Self {
            key,
            display_name: def.display_name.clone(),
            route: def.route.clone(),
            icon: def.icon.clone(),
            children,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// True if `route` is this entry's route or one of its children's.
    pub fn is_active(&self, route: &str) -> bool {
        self.route.as_deref() == Some(route) || self.children.iter().any(|c| c.is_active(route))
    }

    /// Every route reachable through this entry.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.route
            .as_deref()
            .into_iter()
            .chain(self.children.iter().filter_map(|c| c.route.as_deref()))
    }
}

/// Builds the visible menu tree in catalog order.
///
/// An entry is visible when its key is granted. Submenus additionally need a
/// visible parent. A top-level entry left with no route and no visible
/// children is dropped.
pub fn build_menu(catalog: &ModuleCatalog, effective: &EffectivePermissionSet) -> Vec<MenuNode> {
    catalog
        .menus()
        .filter_map(|menu| {
            let key = menu.module_key()?;
            if !effective.can(&key) {
                return None;
            }
            let children: Vec<MenuNode> = catalog
                .submenus_of(&menu.key)
                .filter_map(|sub| {
                    let sub_key = sub.module_key()?;
                    effective
                        .can(&sub_key)
                        .then(|| MenuNode::from_definition(sub_key, sub, Vec::new()))
                })
                .collect();
            if children.is_empty() && menu.route.is_none() {
                return None;
            }
            Some(MenuNode::from_definition(key, menu, children))
        })
        .collect()
}

/// The first top-level entry that is active for `route`.
pub fn active_entry<'a>(menu: &'a [MenuNode], route: &str) -> Option<&'a MenuNode> {
    menu.iter().find(|node| node.is_active(route))
}

/// Which top-level entries are expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuState {
    expanded: BTreeSet<ModuleKey>,
}

impl MenuState {
    /// Initial render: only the active entry, if any, is expanded.
    pub fn initial(menu: &[MenuNode], current_route: &str) -> Self {
        let expanded = active_entry(menu, current_route)
            .map(|node| node.key.clone())
            .into_iter()
            .collect();
        Self { expanded }
    }

    /// Flips one entry. Siblings are left as they are. Returns the new state
    /// of `key`.
    pub fn toggle(&mut self, key: &ModuleKey) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.clone());
            true
        }
    }

    pub fn is_expanded(&self, key: &ModuleKey) -> bool {
        self.expanded.contains(key)
    }

    /// Drops expansion state for entries no longer in `menu`.
    pub fn retain_visible(&mut self, menu: &[MenuNode]) {
        self.expanded.retain(|key| menu.iter().any(|node| &node.key == key));
    }
}
