#![forbid(unsafe_code)]

//! In-memory backend, used by tests and the demo seeder.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{KvStore, StoreError};

/// A `BTreeMap` behind a mutex. Cloning shares the underlying map, so
/// a test can hold one handle while the overlay owns another.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `pairs`.
    pub fn seeded<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Copy out the current contents. Test convenience.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned mutex only means a panic elsewhere; the map itself
        // is still coherent for inspection purposes.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KvStore for MemoryStore {
    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().keys().cloned().collect())
    }

    fn read_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>, StoreError> {
        let entries = self.lock();
        Ok(keys
            .iter()
            .map(|k| (k.clone(), entries.get(k).cloned()))
            .collect())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_keys_in_map_order() {
        let store = MemoryStore::seeded([("b", "2"), ("a", "1")]);
        assert_eq!(store.list_keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn read_many_preserves_input_order_and_marks_absent() {
        let store = MemoryStore::seeded([("a", "1")]);
        let got = store
            .read_many(&["missing".into(), "a".into()])
            .unwrap();
        assert_eq!(
            got,
            vec![
                ("missing".to_string(), None),
                ("a".to_string(), Some("1".to_string())),
            ]
        );
    }

    #[test]
    fn write_overwrites() {
        let store = MemoryStore::seeded([("a", "1")]);
        store.write("a", "99").unwrap();
        assert_eq!(store.snapshot()["a"], "99");
    }

    #[test]
    fn delete_absent_key_is_ok() {
        let store = MemoryStore::new();
        store.delete("ghost").unwrap();
    }

    #[test]
    fn clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.write("k", "v").unwrap();
        assert_eq!(handle.snapshot()["k"], "v");
    }
}
