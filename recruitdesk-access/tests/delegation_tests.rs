use pretty_assertions::assert_eq;
use recruitdesk_access::{
    resolve, AccessError, DelegationPolicy, EffectivePermissionSet, EngineConfig, GlobalFlagSet,
    GranularTabSet, Grantor, OverrideSet,
};
use recruitdesk_store::ModuleCatalog;
use recruitdesk_types::{ModuleKey, Override, PermissionKey, Role, TabKey, UserAccount};
use std::collections::BTreeMap;

struct Fixture {
    account: UserAccount,
    effective: EffectivePermissionSet,
    catalog: ModuleCatalog,
}

impl Fixture {
    fn new(role: Role, open: &[&str], tabs: &[&str]) -> Self {
        let catalog = ModuleCatalog::builtin().for_role(role);
        let ceiling: GlobalFlagSet = open.iter().map(|k| (ModuleKey::new(*k), true)).collect();
        let tabs: GranularTabSet = tabs.iter().map(|k| (TabKey::new(*k), true)).collect();
        let effective = resolve(role, &ceiling, &OverrideSet::new(), &tabs, &catalog);
        Self {
            account: UserAccount::new(format!("{role} user"), role),
            effective,
            catalog,
        }
    }

    fn grantor(&self) -> Grantor<'_> {
        Grantor {
            account: &self.account,
            effective: &self.effective,
            catalog: &self.catalog,
        }
    }
}

fn policy() -> DelegationPolicy {
    EngineConfig::default().delegation_policy()
}

fn module(key: &str) -> PermissionKey {
    PermissionKey::Module(ModuleKey::new(key))
}

fn overrides(entries: &[(&str, bool)]) -> BTreeMap<ModuleKey, Override> {
    entries
        .iter()
        .map(|(k, v)| (ModuleKey::new(*k), Override::Set(*v)))
        .collect()
}

// ── CanGrant ────────────────────────────────────────────────────

#[test]
fn admin_cannot_grant_what_it_lacks() {
    let admin = Fixture::new(Role::Admin, &["documents", "reports"], &[]);
    let grantor = admin.grantor();

    assert!(grantor.can_grant(&module("documents")));
    assert!(!grantor.can_grant(&module("bulk_import")));
}

#[test]
fn super_admin_grants_unconditionally() {
    let root = Fixture::new(Role::SuperAdmin, &[], &[]);
    let grantor = root.grantor();

    assert!(grantor.can_grant(&module("finance")));
    assert!(grantor.can_grant(&PermissionKey::Tab(TabKey::new("candidate_visa"))));
}

#[test]
fn staff_cannot_grant() {
    let staff = Fixture::new(Role::Staff, &["documents"], &["candidate_profile"]);
    let grantor = staff.grantor();

    assert!(!grantor.can_grant(&module("documents")));
    assert!(!grantor.can_grant(&PermissionKey::Tab(TabKey::new("candidate_profile"))));
}

#[test]
fn admin_tab_grants_follow_its_own_tabs() {
    let admin = Fixture::new(Role::Admin, &[], &["candidate_visa"]);
    let grantor = admin.grantor();

    assert!(grantor.can_grant(&PermissionKey::Tab(TabKey::new("candidate_visa"))));
    assert!(!grantor.can_grant(&PermissionKey::Tab(TabKey::new("candidate_travel"))));
}

#[test]
fn can_grant_is_idempotent() {
    let admin = Fixture::new(Role::Admin, &["documents"], &["candidate_visa"]);
    let grantor = admin.grantor();

    for key in [
        module("documents"),
        module("bulk_import"),
        PermissionKey::Tab(TabKey::new("candidate_visa")),
        PermissionKey::Tab(TabKey::new("candidate_travel")),
    ] {
        let first = grantor.can_grant(&key);
        let second = grantor.can_grant(&key);
        assert_eq!(first, second, "{key}");
    }
    assert!(grantor.can_grant(&module("documents")));
    assert!(!grantor.can_grant(&module("bulk_import")));
}

// ── Denylist and offered controls ───────────────────────────────

#[test]
fn denylist_applies_to_staff_targets_only() {
    let policy = policy();
    let root = Fixture::new(Role::SuperAdmin, &[], &[]);
    let grantor = root.grantor();

    assert!(!policy.can_offer(&grantor, Role::Staff, &module("bulk_import")));
    assert!(!policy.can_offer(&grantor, Role::Staff, &module("feature_flags")));
    assert!(policy.can_offer(&grantor, Role::Admin, &module("bulk_import")));
    assert!(policy.can_offer(&grantor, Role::Staff, &module("finance")));
}

#[test]
fn grantable_modules_intersect_grantor_and_denylist() {
    let policy = policy();
    let admin = Fixture::new(
        Role::Admin,
        &["documents", "finance", "administration", "users"],
        &[],
    );

    let offered = policy.grantable_modules(&admin.grantor(), Role::Staff);
    assert_eq!(
        offered,
        vec![ModuleKey::new("documents"), ModuleKey::new("finance")]
    );
    assert!(policy.grantable_modules(&admin.grantor(), Role::Admin).is_empty());
}

#[test]
fn staff_grantor_is_offered_nothing() {
    let policy = policy();
    let staff = Fixture::new(Role::Staff, &["documents"], &["candidate_profile"]);

    assert!(policy.grantable_modules(&staff.grantor(), Role::Staff).is_empty());
    assert!(policy.grantable_tabs(&staff.grantor(), Role::Staff).is_empty());
}

#[test]
fn no_tab_controls_for_super_admin_target() {
    let policy = policy();
    let root = Fixture::new(Role::SuperAdmin, &[], &[]);

    assert!(policy.grantable_tabs(&root.grantor(), Role::SuperAdmin).is_empty());
    assert_eq!(
        policy.grantable_tabs(&root.grantor(), Role::Admin),
        root.catalog.tab_keys()
    );
}

// ── Save request validation ─────────────────────────────────────

#[test]
fn request_with_one_bad_key_is_rejected_whole() {
    let policy = policy();
    let admin = Fixture::new(Role::Admin, &["documents", "reports"], &[]);
    let target = UserAccount::new("Field Agent", Role::Staff);
    let changes = overrides(&[("documents", true), ("finance", true), ("reports", false)]);

    let err = policy
        .check_override_request(&admin.grantor(), &target, &changes)
        .unwrap_err();
    match err {
        AccessError::InvalidGrant { key, .. } => assert_eq!(key, "module:finance"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn denylisted_key_rejected_even_for_super_admin() {
    let policy = policy();
    let root = Fixture::new(Role::SuperAdmin, &[], &[]);
    let target = UserAccount::new("Field Agent", Role::Staff);

    let err = policy
        .check_override_request(&root.grantor(), &target, &overrides(&[("users", true)]))
        .unwrap_err();
    assert!(matches!(err, AccessError::InvalidGrant { .. }));
}

#[test]
fn overrides_only_target_staff() {
    let policy = policy();
    let root = Fixture::new(Role::SuperAdmin, &[], &[]);
    let target = UserAccount::new("Branch Admin", Role::Admin);

    let err = policy
        .check_override_request(&root.grantor(), &target, &overrides(&[("finance", true)]))
        .unwrap_err();
    assert!(matches!(err, AccessError::NotAuthorized(_)));
}

#[test]
fn grantor_must_outrank_target() {
    let policy = policy();
    let admin = Fixture::new(Role::Admin, &[], &["candidate_visa"]);
    let peer = UserAccount::new("Other Admin", Role::Admin);
    let mut changes = BTreeMap::new();
    changes.insert(TabKey::new("candidate_visa"), true);

    let err = policy
        .check_tab_request(&admin.grantor(), &peer, &changes)
        .unwrap_err();
    assert!(matches!(err, AccessError::NotAuthorized(_)));
}

#[test]
fn unknown_keys_are_rejected() {
    let policy = policy();
    let root = Fixture::new(Role::SuperAdmin, &[], &[]);
    let target = UserAccount::new("Field Agent", Role::Staff);

    let err = policy
        .check_override_request(&root.grantor(), &target, &overrides(&[("payroll", true)]))
        .unwrap_err();
    assert!(matches!(err, AccessError::UnknownKey(k) if k == "payroll"));

    let mut tabs = BTreeMap::new();
    tabs.insert(TabKey::new("candidate_payroll"), true);
    let err = policy
        .check_tab_request(&root.grantor(), &target, &tabs)
        .unwrap_err();
    assert!(matches!(err, AccessError::UnknownKey(_)));
}

#[test]
fn valid_tab_request_passes() {
    let policy = policy();
    let root = Fixture::new(Role::SuperAdmin, &[], &[]);
    let target = UserAccount::new("Branch Admin", Role::Admin);
    let mut tabs = BTreeMap::new();
    tabs.insert(TabKey::new("candidate_visa"), true);
    tabs.insert(TabKey::new("candidate_finance"), false);

    assert!(policy.check_tab_request(&root.grantor(), &target, &tabs).is_ok());
}

#[test]
fn custom_denylist_replaces_default() {
    let policy = DelegationPolicy::new(["reports".to_string()]);
    let root = Fixture::new(Role::SuperAdmin, &[], &[]);

    assert!(!policy.can_offer(&root.grantor(), Role::Staff, &module("reports")));
    assert!(policy.can_offer(&root.grantor(), Role::Staff, &module("bulk_import")));
}
