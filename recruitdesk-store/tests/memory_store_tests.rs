use recruitdesk_store::{FailPoint, MemoryPermissionStore, ModuleCatalog, PermissionStore, StoreError};
use recruitdesk_types::{Generation, ModuleKey, Override, UserId};
use std::collections::BTreeMap;

#[tokio::test]
async fn seeding_does_not_bump_generation() {
    let store = MemoryPermissionStore::new(ModuleCatalog::builtin());
    store.seed_global_flag("documents", true).unwrap();
    store.seed_override(UserId::new(), "documents", false).unwrap();

    let snapshot = store.fetch_global_flags().await.unwrap();
    assert_eq!(snapshot.generation, Generation::ZERO);
    assert_eq!(snapshot.flags.get(&ModuleKey::new("documents")), Some(&true));
}

#[tokio::test]
async fn injected_fault_fails_fetch_until_cleared() {
    let store = MemoryPermissionStore::new(ModuleCatalog::builtin());
    store.fail_on(FailPoint::GlobalFlags).unwrap();

    let err = store.fetch_global_flags().await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));

    store.clear_faults().unwrap();
    assert!(store.fetch_global_flags().await.is_ok());
}

#[tokio::test]
async fn failed_persist_writes_nothing() {
    let store = MemoryPermissionStore::new(ModuleCatalog::builtin());
    let user = UserId::new();
    store.fail_on(FailPoint::PersistOverrides).unwrap();

    let mut changes = BTreeMap::new();
    changes.insert(ModuleKey::new("finance"), Override::Set(true));
    changes.insert(ModuleKey::new("reports"), Override::Set(true));
    assert!(store.persist_override_set(user, &changes).await.is_err());

    store.clear_faults().unwrap();
    assert!(store.fetch_user_overrides(user).await.unwrap().is_empty());
    assert_eq!(store.current_generation().await.unwrap(), Generation::ZERO);
}
