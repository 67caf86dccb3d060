//! SQLite-backed permission store.
//!
//! Uses a dedicated SQLite file so permission state is isolated from the
//! candidate/document databases.

use crate::catalog::ModuleCatalog;
use crate::error::{StoreError, StoreResult};
use crate::store::{GlobalFlagSnapshot, PermissionStore};
use async_trait::async_trait;
use recruitdesk_types::{Generation, ModuleKey, Override, Role, TabKey, UserId};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Persistent store for flags, overrides and granular tabs backed by SQLite.
pub struct SqlitePermissionStore {
    conn: Arc<Mutex<Connection>>,
    catalog: ModuleCatalog,
}

impl SqlitePermissionStore {
    /// Opens (or creates) a permission store at the given path.
    pub fn open(path: impl AsRef<Path>, catalog: ModuleCatalog) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Storage(format!("failed to open permission store: {e}")))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            catalog,
        };
        store.init_schema()?;
        info!(path = %path.display(), "Opened permission store");
        Ok(store)
    }

    /// Opens an in-memory permission store (for testing).
    pub fn open_in_memory(catalog: ModuleCatalog) -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            StoreError::Storage(format!("failed to open in-memory permission store: {e}"))
        })?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            catalog,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Storage("permission store lock poisoned".to_string()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS global_flags (
                module_key TEXT PRIMARY KEY,
                enabled INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_overrides (
                user_id TEXT NOT NULL,
                module_key TEXT NOT NULL,
                enabled INTEGER NOT NULL,
                UNIQUE(user_id, module_key)
            );

            CREATE TABLE IF NOT EXISTS granular_tabs (
                user_id TEXT NOT NULL,
                tab_key TEXT NOT NULL,
                enabled INTEGER NOT NULL,
                UNIQUE(user_id, tab_key)
            );

            CREATE TABLE IF NOT EXISTS store_meta (
                name TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );

            INSERT OR IGNORE INTO store_meta (name, value) VALUES ('generation', 0);
            ",
        )
        .map_err(|e| StoreError::Storage(format!("failed to init permission schema: {e}")))?;
        Ok(())
    }

    /// Inserts a flag row for every catalog module key that has none yet.
    /// Existing rows are left alone. Returns the number of rows created.
    pub fn seed_missing_flags(&self, enabled: bool) -> StoreResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for key in self.catalog.module_keys() {
            inserted += tx.execute(
                "INSERT OR IGNORE INTO global_flags (module_key, enabled) VALUES (?1, ?2)",
                params![key.as_str(), enabled],
            )?;
        }
        if inserted > 0 {
            bump_generation(&tx)?;
        }
        tx.commit()?;
        if inserted > 0 {
            info!(inserted, enabled, "Seeded missing global flags");
        }
        Ok(inserted)
    }

    fn read_generation(conn: &Connection) -> StoreResult<Generation> {
        let value: Option<i64> = conn
            .query_row(
                "SELECT value FROM store_meta WHERE name = 'generation'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(Generation::new(value.unwrap_or(0).max(0) as u64))
    }
}

fn bump_generation(tx: &Transaction<'_>) -> StoreResult<Generation> {
    tx.execute(
        "UPDATE store_meta SET value = value + 1 WHERE name = 'generation'",
        [],
    )?;
    let value: i64 = tx.query_row(
        "SELECT value FROM store_meta WHERE name = 'generation'",
        [],
        |row| row.get(0),
    )?;
    Ok(Generation::new(value.max(0) as u64))
}

fn parse_module_key(raw: &str) -> StoreResult<ModuleKey> {
    ModuleKey::parse(raw).map_err(|e| StoreError::InvalidData(format!("module key: {e}")))
}

fn parse_tab_key(raw: &str) -> StoreResult<TabKey> {
    TabKey::parse(raw).map_err(|e| StoreError::InvalidData(format!("tab key: {e}")))
}

#[async_trait]
impl PermissionStore for SqlitePermissionStore {
    async fn fetch_global_flags(&self) -> StoreResult<GlobalFlagSnapshot> {
        let conn = self.lock()?;
        let generation = Self::read_generation(&conn)?;
        let mut stmt = conn.prepare("SELECT module_key, enabled FROM global_flags")?;
        let rows = stmt.query_map([], |row| {
            let key: String = row.get(0)?;
            let enabled: bool = row.get(1)?;
            Ok((key, enabled))
        })?;

        let mut flags = BTreeMap::new();
        for row in rows {
            let (key, enabled) = row?;
            flags.insert(parse_module_key(&key)?, enabled);
        }
        Ok(GlobalFlagSnapshot { flags, generation })
    }

    async fn fetch_user_overrides(&self, user_id: UserId) -> StoreResult<BTreeMap<ModuleKey, bool>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT module_key, enabled FROM user_overrides WHERE user_id = ?1")?;
        let rows = stmt.query_map(params![user_id.to_string()], |row| {
            let key: String = row.get(0)?;
            let enabled: bool = row.get(1)?;
            Ok((key, enabled))
        })?;

        let mut overrides = BTreeMap::new();
        for row in rows {
            let (key, enabled) = row?;
            overrides.insert(parse_module_key(&key)?, enabled);
        }
        Ok(overrides)
    }

    async fn fetch_granular_tabs(&self, user_id: UserId) -> StoreResult<BTreeMap<TabKey, bool>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT tab_key, enabled FROM granular_tabs WHERE user_id = ?1")?;
        let rows = stmt.query_map(params![user_id.to_string()], |row| {
            let key: String = row.get(0)?;
            let enabled: bool = row.get(1)?;
            Ok((key, enabled))
        })?;

        let mut tabs = BTreeMap::new();
        for row in rows {
            let (key, enabled) = row?;
            tabs.insert(parse_tab_key(&key)?, enabled);
        }
        Ok(tabs)
    }

    async fn fetch_module_catalog(&self, role: Role) -> StoreResult<ModuleCatalog> {
        Ok(self.catalog.for_role(role))
    }

    async fn current_generation(&self) -> StoreResult<Generation> {
        let conn = self.lock()?;
        Self::read_generation(&conn)
    }

    async fn persist_global_flag_toggle(&self, key: &ModuleKey, enabled: bool) -> StoreResult<Generation> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO global_flags (module_key, enabled) VALUES (?1, ?2)",
            params![key.as_str(), enabled],
        )?;
        let generation = bump_generation(&tx)?;
        tx.commit()?;
        debug!(module = %key, enabled, %generation, "Persisted global flag");
        Ok(generation)
    }

    async fn persist_override_set(
        &self,
        user_id: UserId,
        changes: &BTreeMap<ModuleKey, Override>,
    ) -> StoreResult<Generation> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let uid = user_id.to_string();
        for (key, decision) in changes {
            match decision {
                Override::Set(enabled) => tx.execute(
                    "INSERT OR REPLACE INTO user_overrides (user_id, module_key, enabled) VALUES (?1, ?2, ?3)",
                    params![uid, key.as_str(), enabled],
                )?,
                Override::Inherit => tx.execute(
                    "DELETE FROM user_overrides WHERE user_id = ?1 AND module_key = ?2",
                    params![uid, key.as_str()],
                )?,
            };
        }
        let generation = bump_generation(&tx)?;
        tx.commit()?;
        debug!(user_id = %user_id, changes = changes.len(), %generation, "Persisted override set");
        Ok(generation)
    }

    async fn persist_granular_tab_set(
        &self,
        user_id: UserId,
        changes: &BTreeMap<TabKey, bool>,
    ) -> StoreResult<Generation> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let uid = user_id.to_string();
        for (key, enabled) in changes {
            tx.execute(
                "INSERT OR REPLACE INTO granular_tabs (user_id, tab_key, enabled) VALUES (?1, ?2, ?3)",
                params![uid, key.as_str(), enabled],
            )?;
        }
        let generation = bump_generation(&tx)?;
        tx.commit()?;
        debug!(user_id = %user_id, changes = changes.len(), %generation, "Persisted granular tabs");
        Ok(generation)
    }
}
