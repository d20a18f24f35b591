//! Offline queue of logs the log service has not acknowledged yet.
//!
//! The whole queue lives under a single key of a [`KeyValueStore`] and is
//! rewritten on every mutation. Volume is a single user's day-scale logging,
//! so whole-value writes stay cheap; keyed incremental writes would be the
//! next step if that stops being true.

use std::collections::HashSet;

use tokio::sync::Mutex;

use crate::db::KeyValueStore;
use crate::error::{Error, Result};
use crate::models::{LocalId, NewLog, PendingLogEntry};

/// Well-known key holding the serialized queue
pub const PENDING_LOGS_KEY: &str = "evident_offline_logs";

/// Durable local persistence of pending log entries
pub struct LocalLogStore<K> {
    kv: K,
    // Serialises read-modify-write cycles so concurrent mutations cannot
    // lose each other's updates.
    write_lock: Mutex<()>,
}

impl<K: KeyValueStore> LocalLogStore<K> {
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    /// Queue `log` under a fresh local id with status `Pending`.
    pub async fn append(&self, log: NewLog) -> Result<PendingLogEntry> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        let entry = PendingLogEntry::new(log);
        entries.push(entry.clone());
        self.save(&entries).await?;

        tracing::debug!(local_id = %entry.local_id, queued = entries.len(), "Queued log locally");
        Ok(entry)
    }

    /// Every queued entry, in insertion order
    pub async fn list_all(&self) -> Result<Vec<PendingLogEntry>> {
        self.load().await
    }

    /// Queued entries still waiting for the log service
    pub async fn list_unsynced(&self) -> Result<Vec<PendingLogEntry>> {
        let mut entries = self.load().await?;
        entries.retain(PendingLogEntry::is_pending);
        Ok(entries)
    }

    /// Flip matching entries to `Synced`.
    ///
    /// Unknown and already-synced ids are ignored. Returns how many entries
    /// changed status.
    pub async fn mark_synced(&self, local_ids: &[LocalId]) -> Result<usize> {
        let wanted = local_ids.iter().collect::<HashSet<_>>();
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;

        let mut flipped = 0;
        for entry in entries
            .iter_mut()
            .filter(|entry| entry.is_pending() && wanted.contains(&entry.local_id))
        {
            entry.mark_synced();
            flipped += 1;
        }

        if flipped > 0 {
            self.save(&entries).await?;
        }
        Ok(flipped)
    }

    /// Drop every `Synced` entry, keeping the pending ones.
    pub async fn purge_synced(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(PendingLogEntry::is_pending);

        let purged = before - entries.len();
        if purged > 0 {
            self.save(&entries).await?;
            tracing::debug!(purged, "Purged synced logs from local queue");
        }
        Ok(purged)
    }

    /// Remove one entry regardless of status. Returns whether it existed.
    pub async fn remove(&self, local_id: &LocalId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|entry| &entry.local_id != local_id);

        if entries.len() == before {
            return Ok(false);
        }
        self.save(&entries).await?;
        Ok(true)
    }

    async fn load(&self) -> Result<Vec<PendingLogEntry>> {
        let Some(raw) = self.kv.get(PENDING_LOGS_KEY).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw)
            .map_err(|error| Error::Storage(format!("local log queue is unreadable: {error}")))
    }

    async fn save(&self, entries: &[PendingLogEntry]) -> Result<()> {
        let raw = serde_json::to_string(entries)?;
        self.kv.set(PENDING_LOGS_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::{LibSqlKeyValueStore, MemoryKeyValueStore};
    use crate::error::ErrorKind;
    use crate::models::{ActivityType, SyncStatus};

    /// Yields to the scheduler inside every call so concurrent callers interleave.
    #[derive(Clone, Default)]
    struct YieldingStore {
        inner: MemoryKeyValueStore,
    }

    impl KeyValueStore for YieldingStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            tokio::task::yield_now().await;
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            tokio::task::yield_now().await;
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key).await
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("disk full".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("disk full".to_string()))
        }
    }

    fn log(description: &str, hour: u32) -> NewLog {
        NewLog::new(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(hour, 30, 0).unwrap(),
            ActivityType::Field,
            description,
        )
    }

    fn store() -> LocalLogStore<MemoryKeyValueStore> {
        LocalLogStore::new(MemoryKeyValueStore::new())
    }

    #[tokio::test]
    async fn append_then_list_unsynced_returns_pending_entry() {
        let store = store();
        let entry = store.append(log("Fixed pump", 9)).await.unwrap();

        let unsynced = store.list_unsynced().await.unwrap();
        assert_eq!(unsynced, vec![entry.clone()]);
        assert_eq!(unsynced[0].status, SyncStatus::Pending);
        assert_eq!(unsynced[0].log.description, "Fixed pump");
    }

    #[tokio::test]
    async fn list_all_preserves_insertion_order() {
        let store = store();
        for (index, name) in ["first", "second", "third"].iter().enumerate() {
            store
                .append(log(name, 12 - u32::try_from(index).unwrap()))
                .await
                .unwrap();
        }

        let descriptions = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.log.description)
            .collect::<Vec<_>>();
        assert_eq!(descriptions, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn concurrent_appends_keep_every_entry_with_distinct_ids() {
        let store = LocalLogStore::new(YieldingStore::default());

        let (a, b, c, d) = tokio::join!(
            store.append(log("a", 8)),
            store.append(log("b", 9)),
            store.append(log("c", 10)),
            store.append(log("d", 11)),
        );
        let appended = [a, b, c, d]
            .into_iter()
            .map(|entry| entry.unwrap().local_id)
            .collect::<HashSet<_>>();
        assert_eq!(appended.len(), 4);

        let persisted = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.local_id)
            .collect::<HashSet<_>>();
        assert_eq!(persisted, appended);
    }

    #[tokio::test]
    async fn mark_synced_then_purge_removes_exactly_marked_entries() {
        let store = store();
        let first = store.append(log("first", 8)).await.unwrap();
        let second = store.append(log("second", 9)).await.unwrap();
        let third = store.append(log("third", 10)).await.unwrap();

        let flipped = store
            .mark_synced(&[second.local_id.clone()])
            .await
            .unwrap();
        assert_eq!(flipped, 1);

        let unsynced = store.list_unsynced().await.unwrap();
        assert_eq!(unsynced, vec![first.clone(), third.clone()]);
        assert_eq!(store.list_all().await.unwrap().len(), 3);

        assert_eq!(store.purge_synced().await.unwrap(), 1);
        assert_eq!(store.list_all().await.unwrap(), vec![first, third]);
    }

    #[tokio::test]
    async fn mark_synced_is_idempotent_and_ignores_unknown_ids() {
        let store = store();
        let entry = store.append(log("only", 8)).await.unwrap();

        assert_eq!(store.mark_synced(&[LocalId::generate()]).await.unwrap(), 0);
        assert_eq!(
            store.mark_synced(&[entry.local_id.clone()]).await.unwrap(),
            1
        );
        assert_eq!(store.mark_synced(&[entry.local_id]).await.unwrap(), 0);

        let all = store.list_all().await.unwrap();
        assert_eq!(all[0].status, SyncStatus::Synced);
        assert!(store.list_unsynced().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_deletes_only_the_named_entry() {
        let store = store();
        let keep = store.append(log("keep", 8)).await.unwrap();
        let gone = store.append(log("gone", 9)).await.unwrap();

        assert!(store.remove(&gone.local_id).await.unwrap());
        assert!(!store.remove(&gone.local_id).await.unwrap());
        assert_eq!(store.list_all().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn persistence_failure_surfaces_to_caller() {
        let store = LocalLogStore::new(BrokenStore);
        let err = store.append(log("lost?", 8)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[tokio::test]
    async fn corrupt_queue_is_a_storage_error() {
        let kv = MemoryKeyValueStore::new();
        kv.set(PENDING_LOGS_KEY, "{not json").await.unwrap();
        let store = LocalLogStore::new(kv);

        let err = store.list_all().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn queue_survives_reopening_libsql_store() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("evident.db");

        let queued = {
            let store = LocalLogStore::new(LibSqlKeyValueStore::open(&path).await.unwrap());
            store.append(log("Fixed pump", 9)).await.unwrap()
        };

        let reopened = LocalLogStore::new(LibSqlKeyValueStore::open(&path).await.unwrap());
        assert_eq!(reopened.list_unsynced().await.unwrap(), vec![queued]);
    }
}
