#![forbid(unsafe_code)]

//! JSON file backend.
//!
//! The whole map is persisted as one JSON object. Every operation goes
//! through the file, so external writers are picked up on the next
//! reload without any cache invalidation. Writes go to a sibling temp
//! file first and are renamed into place, so a crash mid-write leaves
//! the previous snapshot intact.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::{KvStore, StoreError};

/// A key/value store persisted as a single JSON object file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process. External
    // processes are on their own, per the durability non-goals.
    io_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store at `path`. The file is created lazily on first
    /// write; a missing file reads as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Corrupt(format!("{}: {e}", self.path.display()))
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, entries)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), entries = entries.len(), "store persisted");
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.io_lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load()?.into_keys().collect())
    }

    fn read_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>, StoreError> {
        let _guard = self.io_lock.lock().unwrap_or_else(|e| e.into_inner());
        let entries = self.load()?;
        Ok(keys
            .iter()
            .map(|k| (k.clone(), entries.get(k).cloned()))
            .collect())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.persist(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}
