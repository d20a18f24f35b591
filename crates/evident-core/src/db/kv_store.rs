//! Persistent key-value store backing client state

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use libsql::params;
use tokio::sync::Mutex;

use super::Database;
use crate::error::Result;

/// Trait for whole-value key-value storage (async)
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Drop `key`; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// libSQL implementation of `KeyValueStore`
#[derive(Clone)]
pub struct LibSqlKeyValueStore {
    db: Arc<Mutex<Database>>,
}

impl LibSqlKeyValueStore {
    /// Open (or create) the store file at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::open(path).await?;
        Ok(Self::new(db))
    }

    /// Open an in-memory store (primarily for tests)
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self::new(db))
    }

    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }
}

impl KeyValueStore for LibSqlKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query("SELECT value FROM kv_store WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row.get::<String>(0)?))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let db = self.db.lock().await;
        db.connection()
            .execute(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
                params![key, value, now],
            )
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute("DELETE FROM kv_store WHERE key = ?", [key])
            .await?;
        Ok(())
    }
}

/// Process-local `KeyValueStore`; contents vanish with the process.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test(flavor = "multi_thread")]
    async fn libsql_store_set_get_remove() {
        let store = LibSqlKeyValueStore::open_in_memory().await.unwrap();
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.set("greeting", "hello").await.unwrap();
        store.set("greeting", "hello again").await.unwrap();
        assert_eq!(
            store.get("greeting").await.unwrap().as_deref(),
            Some("hello again")
        );

        store.remove("greeting").await.unwrap();
        store.remove("greeting").await.unwrap();
        assert_eq!(store.get("greeting").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn libsql_store_survives_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("evident.db");

        {
            let store = LibSqlKeyValueStore::open(&path).await.unwrap();
            store.set("queue", "[1,2,3]").await.unwrap();
        }

        let reopened = LibSqlKeyValueStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("queue").await.unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[tokio::test]
    async fn memory_store_clones_share_contents() {
        let store = MemoryKeyValueStore::new();
        let clone = store.clone();
        store.set("k", "v").await.unwrap();
        assert_eq!(clone.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
