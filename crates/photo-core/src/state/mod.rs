//! Durable sync state
//!
//! One [`SyncRecord`] per exported photo, keyed by photo id in an embedded
//! `redb` database. Every [`StateStore::put`] is its own write transaction
//! that upserts a single key and commits with an fsync, so a successful
//! return survives a crash and a reader never sees a half-written record.

mod record;

pub use record::SyncRecord;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use redb::{Database, ReadOnlyTable, ReadableTable, TableDefinition, TableError};

use crate::{Error, Result};

/// Photo id to JSON-encoded [`SyncRecord`].
const RECORDS: TableDefinition<&str, &str> = TableDefinition::new("sync_records");

/// Keyed record store backed by one database file.
///
/// The database is opened lazily: a store over a missing file stays empty and
/// creates the file on the first [`put`](Self::put). Writes are serialized
/// through an internal lock.
pub struct StateStore {
    path: PathBuf,
    db: Mutex<Option<Database>>,
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl StateStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store; nothing is written until the first
    /// [`put`](Self::put).
    ///
    /// # Errors
    ///
    /// [`Error::StateStore`] if the file exists but is not a state database,
    /// is locked by another process, or holds a record that does not decode.
    pub fn open(path: &Path) -> Result<Self> {
        let db = if path.exists() {
            Some(Database::open(path).map_err(|e| Error::state(path, format!("corrupt state: {e}")))?)
        } else {
            tracing::debug!(path = %path.display(), "No state file yet, starting empty");
            None
        };

        let store = Self {
            path: path.to_path_buf(),
            db: Mutex::new(db),
        };
        // Decode everything once so a damaged record fails here, before any export.
        let records = store.list_all()?.len();
        tracing::debug!(path = %path.display(), records, "Opened state store");
        Ok(store)
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record for one photo, if it was ever exported.
    pub fn get(&self, photo_id: &str) -> Result<Option<SyncRecord>> {
        let guard = self.lock()?;
        let Some(table) = self.records_table(guard.as_ref())? else {
            return Ok(None);
        };
        let value = table.get(photo_id).map_err(|e| self.error(e))?;
        value.map(|v| self.decode(v.value())).transpose()
    }

    /// Insert or replace the record for `record.photo_id` and persist.
    ///
    /// Only that key is written. On failure the transaction is rolled back
    /// and the store is unchanged.
    pub fn put(&self, record: SyncRecord) -> Result<()> {
        let mut guard = self.lock()?;
        if guard.is_none() {
            *guard = Some(self.create()?);
        }
        let Some(db) = guard.as_ref() else {
            return Err(Error::state(&self.path, "state database unavailable"));
        };

        let encoded = serde_json::to_string(&record)
            .map_err(|e| Error::state(&self.path, format!("failed to serialize record: {e}")))?;
        let txn = db.begin_write().map_err(|e| self.error(e))?;
        {
            let mut table = txn.open_table(RECORDS).map_err(|e| self.error(e))?;
            table
                .insert(record.photo_id.as_str(), encoded.as_str())
                .map_err(|e| self.error(e))?;
        }
        txn.commit().map_err(|e| self.error(e))?;

        tracing::trace!(photo_id = %record.photo_id, "Committed sync record");
        Ok(())
    }

    /// All records ordered by photo id.
    pub fn list_all(&self) -> Result<Vec<SyncRecord>> {
        let guard = self.lock()?;
        let Some(table) = self.records_table(guard.as_ref())? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for entry in table.iter().map_err(|e| self.error(e))? {
            let (_, value) = entry.map_err(|e| self.error(e))?;
            records.push(self.decode(value.value())?);
        }
        Ok(records)
    }

    /// Records exported into one category.
    pub fn list_by_category(&self, category: &str) -> Result<Vec<SyncRecord>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|r| r.category == category)
            .collect())
    }

    /// Number of records.
    pub fn len(&self) -> Result<usize> {
        Ok(self.list_all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn create(&self) -> Result<Database> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }
        let db = Database::create(&self.path).map_err(|e| self.error(e))?;
        tracing::debug!(path = %self.path.display(), "Created state database");
        Ok(db)
    }

    /// Read-only view of the records table, or `None` before the first write.
    fn records_table(
        &self,
        db: Option<&Database>,
    ) -> Result<Option<ReadOnlyTable<&'static str, &'static str>>> {
        let Some(db) = db else {
            return Ok(None);
        };
        let txn = db.begin_read().map_err(|e| self.error(e))?;
        match txn.open_table(RECORDS) {
            Ok(table) => Ok(Some(table)),
            Err(TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(self.error(e)),
        }
    }

    fn decode(&self, raw: &str) -> Result<SyncRecord> {
        serde_json::from_str(raw)
            .map_err(|e| Error::state(&self.path, format!("corrupt record: {e}")))
    }

    fn error(&self, e: impl fmt::Display) -> Error {
        Error::state(&self.path, e)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Database>>> {
        self.db
            .lock()
            .map_err(|_| Error::state(&self.path, "state lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn record(id: &str, category: &str) -> SyncRecord {
        SyncRecord {
            photo_id: id.to_string(),
            album: "Album".to_string(),
            category: category.to_string(),
            output_path: format!("{category}/album/{id}.jpg"),
            fingerprint: "sha256:aa".to_string(),
            params_hash: "sha256:bb".to_string(),
            checksum: "sha256:cc".to_string(),
            synced_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn missing_file_opens_empty_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.redb");
        let store = StateStore::open(&path).unwrap();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.get("p1").unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn put_is_visible_after_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.redb");
        let store = StateStore::open(&path).unwrap();
        store.put(record("p1", "eagles")).unwrap();
        drop(store);

        let reopened = StateStore::open(&path).unwrap();
        assert_eq!(reopened.get("p1").unwrap(), Some(record("p1", "eagles")));
        assert_eq!(reopened.get("missing").unwrap(), None);
    }

    #[test]
    fn put_replaces_record_for_same_photo() {
        let dir = tempdir().unwrap();
        let store = StateStore::open(&dir.path().join("state.redb")).unwrap();
        store.put(record("p1", "eagles")).unwrap();
        let mut updated = record("p1", "eagles");
        updated.fingerprint = "sha256:new".to_string();
        store.put(updated.clone()).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get("p1").unwrap(), Some(updated));
    }

    #[test]
    fn list_all_is_sorted_by_photo_id() {
        let dir = tempdir().unwrap();
        let store = StateStore::open(&dir.path().join("state.redb")).unwrap();
        store.put(record("b", "sailing")).unwrap();
        store.put(record("a", "eagles")).unwrap();

        let ids: Vec<_> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.photo_id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.list_by_category("sailing").unwrap().len(), 1);
    }

    #[test]
    fn many_puts_keep_earlier_records_intact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.redb");
        let store = StateStore::open(&path).unwrap();
        for i in 0..500 {
            store.put(record(&format!("p{i:04}"), "eagles")).unwrap();
        }
        let mut touched = record("p0007", "eagles");
        touched.checksum = "sha256:dd".to_string();
        store.put(touched.clone()).unwrap();
        drop(store);

        let reopened = StateStore::open(&path).unwrap();
        assert_eq!(reopened.len().unwrap(), 500);
        assert_eq!(reopened.get("p0007").unwrap(), Some(touched));
        assert_eq!(reopened.get("p0499").unwrap(), Some(record("p0499", "eagles")));
    }

    #[test]
    fn corrupt_file_is_a_state_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.redb");
        std::fs::write(&path, "this is = = not a database").unwrap();
        let err = StateStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::StateStore { .. }));
    }

    #[test]
    fn undecodable_record_is_a_state_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.redb");
        {
            let db = Database::create(&path).unwrap();
            let txn = db.begin_write().unwrap();
            {
                let mut table = txn.open_table(RECORDS).unwrap();
                table.insert("p1", "{not json").unwrap();
            }
            txn.commit().unwrap();
        }

        let err = StateStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("corrupt record"));
    }

    #[test]
    fn failed_write_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let store = StateStore::open(&blocker.join("state.redb")).unwrap();

        assert!(store.put(record("p1", "eagles")).is_err());
        assert_eq!(store.get("p1").unwrap(), None);
        assert!(store.is_empty().unwrap());
    }
}
