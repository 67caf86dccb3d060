use pretty_assertions::assert_eq;
use recruitdesk_access::{AccessError, EngineConfig, PermissionAdmin, PermissionSession};
use recruitdesk_store::{FailPoint, MemoryPermissionStore, ModuleCatalog, PermissionStore, StoreError};
use recruitdesk_types::{Generation, ModuleKey, Override, Role, TabKey, UserAccount};
use std::collections::BTreeMap;
use std::sync::Arc;

struct Harness {
    store: Arc<MemoryPermissionStore>,
    admin: PermissionAdmin,
}

impl Harness {
    fn new(open: &[&str]) -> Self {
        let store = MemoryPermissionStore::new(ModuleCatalog::builtin());
        for key in open {
            store.seed_global_flag(*key, true).unwrap();
        }
        let store = Arc::new(store);
        let dyn_store: Arc<dyn PermissionStore> = store.clone();
        let admin = PermissionAdmin::new(dyn_store, EngineConfig::default().delegation_policy());
        Self { store, admin }
    }

    async fn session(&self, account: UserAccount) -> PermissionSession {
        let store: Arc<dyn PermissionStore> = self.store.clone();
        PermissionSession::start(store, Arc::new(EngineConfig::default()), account).await
    }
}

fn overrides(entries: &[(&str, bool)]) -> BTreeMap<ModuleKey, Override> {
    entries
        .iter()
        .map(|(k, v)| (ModuleKey::new(*k), Override::Set(*v)))
        .collect()
}

#[tokio::test]
async fn super_admin_toggle_refreshes_own_session() {
    let h = Harness::new(&["documents"]);
    let mut root = h.session(UserAccount::new("Owner", Role::SuperAdmin)).await;
    assert!(!root.can(&ModuleKey::new("reports")));

    let generation = h
        .admin
        .toggle_global_flag(&mut root, &ModuleKey::new("reports"), true)
        .await
        .unwrap();

    assert_eq!(generation, Generation::new(1));
    assert_eq!(root.generation(), Some(generation));
    assert!(root.can(&ModuleKey::new("reports")));
}

#[tokio::test]
async fn only_super_admin_toggles_flags() {
    let h = Harness::new(&["documents"]);
    let mut admin = h.session(UserAccount::new("Branch Admin", Role::Admin)).await;

    let err = h
        .admin
        .toggle_global_flag(&mut admin, &ModuleKey::new("documents"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::NotAuthorized(_)));
    assert_eq!(h.store.current_generation().await.unwrap(), Generation::ZERO);
}

#[tokio::test]
async fn toggle_rejects_unknown_module() {
    let h = Harness::new(&[]);
    let mut root = h.session(UserAccount::new("Owner", Role::SuperAdmin)).await;

    let err = h
        .admin
        .toggle_global_flag(&mut root, &ModuleKey::new("payroll"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::UnknownKey(_)));
}

#[tokio::test]
async fn rejected_save_writes_nothing() {
    let h = Harness::new(&["documents", "reports"]);
    let mut grantor = h.session(UserAccount::new("Branch Admin", Role::Admin)).await;
    let target = UserAccount::new("Field Agent", Role::Staff);

    assert!(!grantor.can_grant(&ModuleKey::new("bulk_import").into()));
    let err = h
        .admin
        .save_overrides(
            &mut grantor,
            &target,
            &overrides(&[("documents", true), ("bulk_import", true)]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AccessError::InvalidGrant { .. }));
    assert!(h.store.fetch_user_overrides(target.id).await.unwrap().is_empty());
    assert_eq!(h.store.current_generation().await.unwrap(), Generation::ZERO);
}

#[tokio::test]
async fn ungranted_module_outside_denylist_is_rejected() {
    let h = Harness::new(&["documents", "reports"]);
    let mut grantor = h.session(UserAccount::new("Branch Admin", Role::Admin)).await;
    let target = UserAccount::new("Field Agent", Role::Staff);

    assert!(!h.admin.policy().is_denied_for(Role::Staff, &ModuleKey::new("finance").into()));
    assert!(!grantor.can_grant(&ModuleKey::new("finance").into()));

    let err = h
        .admin
        .save_overrides(
            &mut grantor,
            &target,
            &overrides(&[("documents", true), ("finance", true)]),
        )
        .await
        .unwrap_err();

    match err {
        AccessError::InvalidGrant { key, .. } => assert_eq!(key, "module:finance"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(h.store.fetch_user_overrides(target.id).await.unwrap().is_empty());
    assert_eq!(h.store.current_generation().await.unwrap(), Generation::ZERO);
}

#[tokio::test]
async fn saved_overrides_reach_target_session() {
    let h = Harness::new(&["documents", "reports"]);
    let mut grantor = h.session(UserAccount::new("Branch Admin", Role::Admin)).await;
    let target = UserAccount::new("Field Agent", Role::Staff);
    let mut target_session = h.session(target.clone()).await;
    assert!(target_session.can(&ModuleKey::new("reports")));

    h.admin
        .save_overrides(&mut grantor, &target, &overrides(&[("reports", false)]))
        .await
        .unwrap();

    assert!(target_session.ensure_fresh().await);
    assert!(!target_session.can(&ModuleKey::new("reports")));
    assert!(target_session.can(&ModuleKey::new("documents")));
}

#[tokio::test]
async fn inherit_clears_a_stored_override() {
    let h = Harness::new(&["reports"]);
    let mut root = h.session(UserAccount::new("Owner", Role::SuperAdmin)).await;
    let target = UserAccount::new("Field Agent", Role::Staff);
    h.store.seed_override(target.id, "reports", false).unwrap();

    let mut changes = BTreeMap::new();
    changes.insert(ModuleKey::new("reports"), Override::Inherit);
    h.admin.save_overrides(&mut root, &target, &changes).await.unwrap();

    assert!(h.store.fetch_user_overrides(target.id).await.unwrap().is_empty());
    assert!(h.session(target).await.can(&ModuleKey::new("reports")));
}

#[tokio::test]
async fn repeated_save_is_idempotent() {
    let h = Harness::new(&["documents"]);
    let mut root = h.session(UserAccount::new("Owner", Role::SuperAdmin)).await;
    let target = UserAccount::new("Field Agent", Role::Staff);
    let changes = overrides(&[("documents", false)]);

    h.admin.save_overrides(&mut root, &target, &changes).await.unwrap();
    let first = h.store.fetch_user_overrides(target.id).await.unwrap();
    h.admin.save_overrides(&mut root, &target, &changes).await.unwrap();
    let second = h.store.fetch_user_overrides(target.id).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_request_returns_current_generation() {
    let h = Harness::new(&[]);
    let mut root = h.session(UserAccount::new("Owner", Role::SuperAdmin)).await;
    let target = UserAccount::new("Field Agent", Role::Staff);

    let generation = h
        .admin
        .save_overrides(&mut root, &target, &BTreeMap::new())
        .await
        .unwrap();
    assert_eq!(generation, Generation::ZERO);
}

#[tokio::test]
async fn admin_revoked_mid_session_cannot_grant() {
    let h = Harness::new(&["documents", "reports"]);
    let mut root = h.session(UserAccount::new("Owner", Role::SuperAdmin)).await;
    let mut grantor = h.session(UserAccount::new("Branch Admin", Role::Admin)).await;
    let target = UserAccount::new("Field Agent", Role::Staff);
    assert!(grantor.can(&ModuleKey::new("reports")));

    h.admin
        .toggle_global_flag(&mut root, &ModuleKey::new("reports"), false)
        .await
        .unwrap();

    let err = h
        .admin
        .save_overrides(&mut grantor, &target, &overrides(&[("reports", true)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::InvalidGrant { .. }));
}

#[tokio::test]
async fn granular_tabs_saved_for_admin_target() {
    let h = Harness::new(&[]);
    let mut root = h.session(UserAccount::new("Owner", Role::SuperAdmin)).await;
    let target = UserAccount::new("Branch Admin", Role::Admin);
    let mut changes = BTreeMap::new();
    changes.insert(TabKey::new("candidate_visa"), true);

    h.admin
        .save_granular_tabs(&mut root, &target, &changes)
        .await
        .unwrap();

    let session = h.session(target).await;
    assert!(session.can_tab(&TabKey::new("candidate_visa")));
    let tabs = session.build_candidate_tabs(None);
    assert_eq!(tabs.active(), Some(&TabKey::new("candidate_visa")));
}

#[tokio::test]
async fn store_failure_surfaces_as_error() {
    let h = Harness::new(&["documents"]);
    let mut root = h.session(UserAccount::new("Owner", Role::SuperAdmin)).await;
    let target = UserAccount::new("Field Agent", Role::Staff);
    h.store.fail_on(FailPoint::PersistOverrides).unwrap();

    let err = h
        .admin
        .save_overrides(&mut root, &target, &overrides(&[("documents", false)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::Store(StoreError::Unavailable(_))));
}

#[tokio::test]
async fn grantable_lists_follow_session() {
    let h = Harness::new(&["documents", "finance", "users"]);
    let admin = h.session(UserAccount::new("Branch Admin", Role::Admin)).await;

    assert_eq!(
        h.admin.grantable_modules(&admin, Role::Staff),
        vec![ModuleKey::new("documents"), ModuleKey::new("finance")]
    );
    assert!(h.admin.grantable_tabs(&admin, Role::Staff).is_empty());
}
