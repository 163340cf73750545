//! Heartbeat store contract and its redb implementation.
//!
//! [`RedbStore`] supports both on-disk and in-memory backends (the latter
//! for testing). Every operation runs in its own redb transaction.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::HEARTBEATS;
use crate::types::HeartbeatRecord;

/// Durable map from identifier to its latest heartbeat.
///
/// Implementations must make `put` atomic per identifier and must let any
/// read that starts after a `put` returns observe it.
pub trait HeartbeatStore: Send + Sync {
    /// Insert the record, replacing any previous record with the same id.
    fn put(&self, record: &HeartbeatRecord) -> StateResult<()>;

    /// Fetch the record for `id`, or `None` if it was never stored.
    fn get(&self, id: &str) -> StateResult<Option<HeartbeatRecord>>;

    /// Remove the record for `id`. Returns true if it existed.
    fn delete(&self, id: &str) -> StateResult<bool>;

    /// Remove every record whose stored expiry is strictly before `now`.
    /// Records without an expiry are kept. Returns the number removed.
    fn delete_expired(&self, now: DateTime<Utc>) -> StateResult<usize>;
}

/// Thread-safe heartbeat store backed by redb.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "heartbeat store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder().create_with_backend(backend)?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory heartbeat store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write()?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(HEARTBEATS)?;
        txn.commit()?;
        Ok(())
    }
}

impl HeartbeatStore for RedbStore {
    fn put(&self, record: &HeartbeatRecord) -> StateResult<()> {
        let key = record.table_key();
        let value = serde_json::to_vec(record).map_err(StateError::Encode)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(HEARTBEATS)?;
            table.insert(key, value.as_slice())?;
        }
        txn.commit()?;
        debug!(%key, "heartbeat stored");
        Ok(())
    }

    fn get(&self, id: &str) -> StateResult<Option<HeartbeatRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(HEARTBEATS)?;
        match table.get(id)? {
            Some(guard) => {
                let record: HeartbeatRecord =
                    serde_json::from_slice(guard.value()).map_err(StateError::Decode)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn delete(&self, id: &str) -> StateResult<bool> {
        let txn = self.db.begin_write()?;
        let existed;
        {
            let mut table = txn.open_table(HEARTBEATS)?;
            existed = table.remove(id)?.is_some();
        }
        txn.commit()?;
        debug!(%id, existed, "heartbeat deleted");
        Ok(existed)
    }

    fn delete_expired(&self, now: DateTime<Utc>) -> StateResult<usize> {
        // Scan and delete under one write transaction: a concurrent put lands
        // either before the scan or after the commit.
        let txn = self.db.begin_write()?;
        let count;
        {
            let mut table = txn.open_table(HEARTBEATS)?;
            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let record: HeartbeatRecord =
                    serde_json::from_slice(value.value()).map_err(StateError::Decode)?;
                if record.expiry.is_some_and(|expiry| now > expiry) {
                    expired.push(key.value().to_string());
                }
            }
            for key in &expired {
                table.remove(key.as_str())?;
            }
            count = expired.len();
        }
        txn.commit()?;
        debug!(count, "expired heartbeats purged");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeDelta;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn test_record(id: &str) -> HeartbeatRecord {
        let mut metadata = BTreeMap::new();
        metadata.insert("region".to_string(), "eu-west-1".to_string());
        HeartbeatRecord::new(id, at(0))
            .with_expiry(at(60))
            .with_label("primary")
            .with_metadata(metadata)
    }

    #[test]
    fn put_and_get() {
        let store = RedbStore::open_in_memory().unwrap();
        let record = test_record("svc-a");

        store.put(&record).unwrap();
        let retrieved = store.get("svc-a").unwrap();

        assert_eq!(retrieved, Some(record));
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let store = RedbStore::open_in_memory().unwrap();
        assert!(store.get("never-seen").unwrap().is_none());
    }

    #[test]
    fn put_replaces_whole_record() {
        let store = RedbStore::open_in_memory().unwrap();
        store.put(&test_record("svc-a")).unwrap();

        let replacement = HeartbeatRecord::new("svc-a", at(10));
        store.put(&replacement).unwrap();

        let retrieved = store.get("svc-a").unwrap().unwrap();
        assert_eq!(retrieved, replacement);
        assert!(retrieved.label.is_none());
        assert!(retrieved.metadata.is_empty());
        assert!(retrieved.expiry.is_none());
    }

    #[test]
    fn delete() {
        let store = RedbStore::open_in_memory().unwrap();
        store.put(&test_record("svc-a")).unwrap();

        assert!(store.delete("svc-a").unwrap());
        assert!(!store.delete("svc-a").unwrap());
        assert!(store.get("svc-a").unwrap().is_none());
    }

    #[test]
    fn delete_expired_keeps_fresh_and_open_ended() {
        let store = RedbStore::open_in_memory().unwrap();
        store
            .put(&HeartbeatRecord::new("stale", at(0)).with_expiry(at(10)))
            .unwrap();
        store
            .put(&HeartbeatRecord::new("boundary", at(0)).with_expiry(at(20)))
            .unwrap();
        store
            .put(&HeartbeatRecord::new("fresh", at(0)).with_expiry(at(30)))
            .unwrap();
        store.put(&HeartbeatRecord::new("open", at(0))).unwrap();

        let purged = store.delete_expired(at(20)).unwrap();
        assert_eq!(purged, 1);

        assert!(store.get("stale").unwrap().is_none());
        for id in ["boundary", "fresh", "open"] {
            assert!(store.get(id).unwrap().is_some(), "{id} was purged");
        }

        let purged = store.delete_expired(at(20) + TimeDelta::nanoseconds(1)).unwrap();
        assert_eq!(purged, 1);
    }

    #[test]
    fn concurrent_puts_leave_one_write() {
        let store = RedbStore::open_in_memory().unwrap();
        let writes: Vec<HeartbeatRecord> = (0..8)
            .map(|i| {
                let mut metadata = BTreeMap::new();
                metadata.insert("writer".to_string(), i.to_string());
                HeartbeatRecord::new("svc-a", at(i))
                    .with_expiry(at(100 + i))
                    .with_label(format!("writer-{i}"))
                    .with_metadata(metadata)
            })
            .collect();

        std::thread::scope(|scope| {
            for record in &writes {
                let store = store.clone();
                scope.spawn(move || store.put(record).unwrap());
            }
        });

        let stored = store.get("svc-a").unwrap().unwrap();
        assert!(writes.contains(&stored), "merged record: {stored:?}");
    }

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = RedbStore::open(&db_path).unwrap();
            store.put(&test_record("svc-a")).unwrap();
        }

        // Reopen the same database file.
        let store = RedbStore::open(&db_path).unwrap();
        assert_eq!(store.get("svc-a").unwrap(), Some(test_record("svc-a")));
    }

    #[test]
    fn empty_store_operations() {
        let store = RedbStore::open_in_memory().unwrap();

        assert!(store.get("nope").unwrap().is_none());
        assert!(!store.delete("nope").unwrap());
        assert_eq!(store.delete_expired(at(0)).unwrap(), 0);
    }
}
