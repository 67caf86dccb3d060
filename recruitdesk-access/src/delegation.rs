//! Delegation authority check.
//!
//! A grantor may never hand out a permission it does not itself effectively
//! hold. `super_admin` is unconditional; `admin` is bounded by its own
//! effective set; `staff` cannot delegate. Independently of the grantor, a
//! fixed denylist of keys is never offered to a `staff` target.
//!
//! Save requests are validated in full before anything is persisted, so a
//! request is either accepted whole or rejected whole.

use crate::error::{AccessError, AccessResult};
use crate::resolver::EffectivePermissionSet;
use recruitdesk_store::ModuleCatalog;
use recruitdesk_types::{ModuleKey, Override, PermissionKey, Role, TabKey, UserAccount};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// The acting side of a delegation.
#[derive(Debug, Clone, Copy)]
pub struct Grantor<'a> {
    pub account: &'a UserAccount,
    pub effective: &'a EffectivePermissionSet,
    pub catalog: &'a ModuleCatalog,
}

impl Grantor<'_> {
    pub fn role(&self) -> Role {
        self.account.role
    }

    /// Whether this grantor may grant or revoke `key` for anyone.
    pub fn can_grant(&self, key: &PermissionKey) -> bool {
        match self.role() {
            Role::SuperAdmin => true,
            Role::Admin => match key {
                PermissionKey::Module(k) => self.effective.can(k),
                PermissionKey::Tab(k) => self.effective.can_tab(k),
            },
            Role::Staff => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationPolicy {
    staff_denied: BTreeSet<String>,
}

impl DelegationPolicy {
    pub fn new(staff_denied: impl IntoIterator<Item = String>) -> Self {
        Self {
            staff_denied: staff_denied.into_iter().collect(),
        }
    }

    /// True if `key` is role-gated away from `target`.
    pub fn is_denied_for(&self, target: Role, key: &PermissionKey) -> bool {
        target == Role::Staff && self.staff_denied.contains(key.as_str())
    }

    /// Whether a grant/revoke control for `key` should be shown when editing
    /// a user with role `target`.
    pub fn can_offer(&self, grantor: &Grantor<'_>, target: Role, key: &PermissionKey) -> bool {
        grantor.can_grant(key) && !self.is_denied_for(target, key)
    }

    /// Module keys whose override controls may be rendered for `target`.
    pub fn grantable_modules(&self, grantor: &Grantor<'_>, target: Role) -> Vec<ModuleKey> {
        if !grantor.role().is_privileged() || target != Role::Staff {
            return Vec::new();
        }
        grantor
            .catalog
            .module_keys()
            .into_iter()
            .filter(|k| self.can_offer(grantor, target, &PermissionKey::Module(k.clone())))
            .collect()
    }

    /// Tab keys whose controls may be rendered for `target`.
    pub fn grantable_tabs(&self, grantor: &Grantor<'_>, target: Role) -> Vec<TabKey> {
        if !grantor.role().is_privileged() || target == Role::SuperAdmin {
            return Vec::new();
        }
        grantor
            .catalog
            .tab_keys()
            .into_iter()
            .filter(|k| self.can_offer(grantor, target, &PermissionKey::Tab(k.clone())))
            .collect()
    }

    /// Validates a whole override save request.
    pub fn check_override_request(
        &self,
        grantor: &Grantor<'_>,
        target: &UserAccount,
        changes: &BTreeMap<ModuleKey, Override>,
    ) -> AccessResult<()> {
        check_outranks(grantor, target)?;
        if target.role != Role::Staff {
            return Err(AccessError::NotAuthorized(format!(
                "overrides only apply to staff accounts, '{}' is {}",
                target.display_name, target.role
            )));
        }
        for key in changes.keys() {
            if !grantor.catalog.contains_module(key) {
                return Err(reject_unknown(grantor, key.as_str()));
            }
            self.check_key(grantor, target, &PermissionKey::Module(key.clone()))?;
        }
        Ok(())
    }

    /// Validates a whole granular tab save request.
    pub fn check_tab_request(
        &self,
        grantor: &Grantor<'_>,
        target: &UserAccount,
        changes: &BTreeMap<TabKey, bool>,
    ) -> AccessResult<()> {
        check_outranks(grantor, target)?;
        if target.role == Role::SuperAdmin {
            return Err(AccessError::NotAuthorized(
                "super_admin tab access cannot be edited".to_string(),
            ));
        }
        for key in changes.keys() {
            if !grantor.catalog.contains_tab(key) {
                return Err(reject_unknown(grantor, key.as_str()));
            }
            self.check_key(grantor, target, &PermissionKey::Tab(key.clone()))?;
        }
        Ok(())
    }

    fn check_key(&self, grantor: &Grantor<'_>, target: &UserAccount, key: &PermissionKey) -> AccessResult<()> {
        let reason = if !grantor.can_grant(key) {
            "grantor does not hold this permission"
        } else if self.is_denied_for(target.role, key) {
            "permission is never delegated to staff"
        } else {
            return Ok(());
        };
        warn!(
            grantor = %grantor.account.id,
            target = %target.id,
            key = %key,
            reason,
            "Rejected grant attempt"
        );
        Err(AccessError::InvalidGrant {
            key: key.to_string(),
            reason: reason.to_string(),
        })
    }
}

fn check_outranks(grantor: &Grantor<'_>, target: &UserAccount) -> AccessResult<()> {
    if grantor.role().outranks(target.role) {
        Ok(())
    } else {
        warn!(grantor = %grantor.account.id, target = %target.id, "Grantor does not outrank target");
        Err(AccessError::NotAuthorized(format!(
            "{} cannot edit permissions of {}",
            grantor.role(),
            target.role
        )))
    }
}

fn reject_unknown(grantor: &Grantor<'_>, key: &str) -> AccessError {
    warn!(grantor = %grantor.account.id, key, "Grant attempt for unknown key");
    AccessError::UnknownKey(key.to_string())
}
