//! Key/value local storage, the on-device analogue of browser local storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::{Error, Result};

use super::Database;

/// String values stored under string keys
#[allow(async_fn_in_trait)]
pub trait LocalStorage {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Drop the value stored under `key`
    async fn remove(&self, key: &str) -> Result<()>;
}

/// libSQL implementation of `LocalStorage`
pub struct LibSqlLocalStorage {
    db: Database,
}

impl LibSqlLocalStorage {
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (or create) the storage file at `path`
    pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(Database::open(path).await?))
    }

    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?))
    }
}

impl LocalStorage for LibSqlLocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .db
            .connection()
            .query("SELECT value FROM local_storage WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO local_storage (key, value, updated_at) VALUES (?, ?, ?)",
                libsql::params![key, value, now],
            )
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.db
            .connection()
            .execute("DELETE FROM local_storage WHERE key = ?", [key])
            .await?;
        Ok(())
    }
}

/// In-process `LocalStorage`, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryLocalStorage {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryLocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`remove` fail (simulates a full disk)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(Error::Storage("local storage is not writable".into()))
        } else {
            Ok(())
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))
    }
}

impl LocalStorage for MemoryLocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_libsql_set_get_remove() {
        let storage = LibSqlLocalStorage::open_in_memory().await.unwrap();

        assert_eq!(storage.get("missing").await.unwrap(), None);

        storage.set("greeting", "merhaba").await.unwrap();
        storage.set("greeting", "selam").await.unwrap();
        assert_eq!(
            storage.get("greeting").await.unwrap().as_deref(),
            Some("selam")
        );

        storage.remove("greeting").await.unwrap();
        assert_eq!(storage.get("greeting").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_libsql_values_survive_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("storage.db");

        {
            let storage = LibSqlLocalStorage::open(&path).await.unwrap();
            storage.set("last_sync_time", "2024-01-01T00:00:00Z").await.unwrap();
        }

        let reopened = LibSqlLocalStorage::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("last_sync_time").await.unwrap().as_deref(),
            Some("2024-01-01T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn test_memory_storage_can_refuse_writes() {
        let storage = MemoryLocalStorage::new();
        storage.set("key", "value").await.unwrap();

        storage.set_fail_writes(true);
        assert!(matches!(
            storage.set("key", "other").await,
            Err(Error::Storage(_))
        ));
        assert_eq!(storage.get("key").await.unwrap().as_deref(), Some("value"));
    }
}
