//! Key-value persistence seam shared by the day cache and the translation cache.
//!
//! Implemented by `oneul-storage-sqlite` for the server and by [`MemoryStore`]
//! for tests and ephemeral use.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use log::warn;

use crate::errors::HistoryError;

/// String key-value store with prefix listing.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;

    /// Insert or overwrite.
    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), HistoryError>;

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, HistoryError>;
}

/// In-memory [`KeyValueStore`].
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Memory store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.lock_entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        self.lock_entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        self.lock_entries().remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, HistoryError> {
        Ok(self
            .lock_entries()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("2".to_string()));

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_keys_with_prefix() {
        let store = MemoryStore::new();
        store.set("history_data_2025-01-01", "x").unwrap();
        store.set("history_data_2025-01-02", "x").unwrap();
        store.set("history_translations_cache", "x").unwrap();

        let keys = store.keys_with_prefix("history_data_").unwrap();
        assert_eq!(keys, vec!["history_data_2025-01-01", "history_data_2025-01-02"]);
    }
}
