//! The entry store: the single owner of the recorded meal history.
//!
//! The collection is kept most-recent-first and written in full to the
//! key-value store after every append. Readers only ever see immutable
//! snapshots.

use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

use crate::models::FoodEntry;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the serialized entry collection.
pub const ENTRIES_KEY: &str = "nutrisnap_entries";

/// The persisted entry blob could not be read back.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to read entry history: {0}")]
    Read(#[from] StorageError),

    #[error("Entry history is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// An append could not be persisted.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to write entry history: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to encode entry history: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("An entry with id '{0}' already exists")]
    DuplicateId(String),
}

/// Owns the canonical collection of food entries.
pub struct EntryStore<S> {
    storage: S,
    entries: RwLock<Arc<[FoodEntry]>>,
}

impl<S: KeyValueStore> EntryStore<S> {
    /// Opens the store and hydrates it from `storage`.
    ///
    /// Never fails: an unreadable history starts the store empty.
    pub fn open(storage: S) -> Self {
        let entries = Self::load(&storage);
        Self {
            storage,
            entries: RwLock::new(entries.into()),
        }
    }

    /// Reads the persisted collection.
    ///
    /// A missing key yields an empty list. A corrupt blob also yields an
    /// empty list, after logging the decode error.
    pub fn load(storage: &S) -> Vec<FoodEntry> {
        match Self::try_load(storage) {
            Ok(entries) => {
                tracing::debug!("Loaded {} entry(ies)", entries.len());
                entries
            }
            Err(e) => {
                tracing::warn!("Discarding entry history: {}", e);
                Vec::new()
            }
        }
    }

    fn try_load(storage: &S) -> Result<Vec<FoodEntry>, DecodeError> {
        match storage.get(ENTRIES_KEY)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(Vec::new()),
        }
    }

    /// Adds an entry at the head of the collection, then persists.
    ///
    /// If persisting fails the entry stays in memory and the error is
    /// returned; the stored history lags until the next successful write.
    pub fn append(&self, entry: FoodEntry) -> Result<(), PersistenceError> {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if guard.iter().any(|e| e.id == entry.id) {
            return Err(PersistenceError::DuplicateId(entry.id));
        }

        let mut next = Vec::with_capacity(guard.len() + 1);
        next.push(entry);
        next.extend(guard.iter().cloned());
        *guard = next.into();

        let result = self.persist(&guard);
        if let Err(e) = &result {
            tracing::warn!("Entry kept in memory but not persisted: {}", e);
        }
        result
    }

    fn persist(&self, entries: &[FoodEntry]) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(entries)?;
        self.storage.set(ENTRIES_KEY, &blob)?;
        Ok(())
    }

    /// An immutable view of the collection as of now.
    pub fn snapshot(&self) -> Arc<[FoodEntry]> {
        Arc::clone(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Up to `limit` of the most recent entries.
    pub fn recent(&self, limit: usize) -> Vec<FoodEntry> {
        self.snapshot().iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{FoodAnalysis, MacroNutrients};
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::TempDir;

    /// Accepts reads, fails every write.
    #[derive(Default)]
    pub(crate) struct ReadOnlyStore(pub(crate) MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk full".to_string()))
        }
    }

    fn entry(name: &str, calories: u32, timestamp: i64) -> FoodEntry {
        FoodEntry::new(
            FoodAnalysis::new(name, MacroNutrients::new(calories, 10, 10, 10), ""),
            timestamp,
        )
    }

    #[test]
    fn test_open_missing_key_is_empty() {
        let store = EntryStore::open(MemoryStore::new());
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_corrupt_blob_is_empty() {
        let store = EntryStore::open(MemoryStore::with_value(ENTRIES_KEY, "{not json"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_wrong_shape_is_empty() {
        let blob = r#"[{"name":"partial"}]"#;
        let store = EntryStore::open(MemoryStore::with_value(ENTRIES_KEY, blob));
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_inserts_at_head() {
        let store = EntryStore::open(MemoryStore::new());
        store.append(entry("first", 100, 1)).unwrap();
        store.append(entry("second", 200, 2)).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name(), "second");
        assert_eq!(snapshot[1].name(), "first");
    }

    #[test]
    fn test_load_after_append_roundtrip() {
        let store = EntryStore::open(MemoryStore::new());
        store.append(entry("old", 100, 1)).unwrap();
        let e = entry("new", 500, 2);
        store.append(e.clone()).unwrap();

        let loaded = EntryStore::load(store.storage());
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], e);
        assert_eq!(loaded.iter().filter(|x| x.id == e.id).count(), 1);
    }

    #[test]
    fn test_reopen_from_file_store() {
        let temp_dir = TempDir::new().unwrap();
        let e = entry("persisted", 420, 1_700_000_000_000).with_image_url("data:image/jpeg;base64,AA==");

        {
            let store = EntryStore::open(FileStore::new(temp_dir.path().to_path_buf()));
            store.append(e.clone()).unwrap();
        }

        let reopened = EntryStore::open(FileStore::new(temp_dir.path().to_path_buf()));
        assert_eq!(reopened.snapshot().to_vec(), vec![e]);
    }

    #[test]
    fn test_snapshot_is_immutable() {
        let store = EntryStore::open(MemoryStore::new());
        store.append(entry("a", 1, 1)).unwrap();
        let before = store.snapshot();

        store.append(entry("b", 2, 2)).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = EntryStore::open(MemoryStore::new());
        let e = entry("a", 1, 1).with_id("same");
        store.append(e.clone()).unwrap();

        let result = store.append(entry("b", 2, 2).with_id("same"));
        assert!(matches!(result, Err(PersistenceError::DuplicateId(id)) if id == "same"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_write_failure_keeps_entry_in_memory() {
        let store = EntryStore::open(ReadOnlyStore::default());

        let result = store.append(entry("unsaved", 300, 1));

        assert!(matches!(result, Err(PersistenceError::Storage(_))));
        assert_eq!(store.len(), 1);
        assert!(EntryStore::load(store.storage()).is_empty());
    }

    #[test]
    fn test_recent_limits() {
        let store = EntryStore::open(MemoryStore::new());
        for i in 0..7 {
            store.append(entry(&format!("meal {}", i), 100, i)).unwrap();
        }

        let recent = store.recent(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].name(), "meal 6");
    }
}
