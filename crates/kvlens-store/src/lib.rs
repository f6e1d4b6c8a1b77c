#![forbid(unsafe_code)]

//! Storage backends for the kvlens inspector overlay.
//!
//! The overlay treats the store as an opaque capability with four
//! operations: enumerate keys, bulk-read values, write one entry,
//! delete one entry. Everything else (durability, cross-process
//! consistency, formats) belongs to the backend.
//!
//! All operations are blocking; callers are expected to run them off
//! the UI thread (the runtime's `Cmd::Task` does exactly that).

mod file;
mod memory;

use std::io;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Errors produced by storage backends.
///
/// The overlay collapses every variant into one generic user-facing
/// notice; the variants exist so internal logs can name the failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// An underlying I/O fault.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backend's persisted state could not be decoded.
    #[error("storage data corrupt: {0}")]
    Corrupt(String),
}

/// The storage collaborator consumed by the overlay.
///
/// Invariants:
/// - `read_many` preserves the order of its input keys; a key that
///   vanished since enumeration maps to `None` rather than an error.
/// - `write` has overwrite semantics and creates absent keys.
/// - `delete` of an absent key succeeds.
pub trait KvStore: Send + Sync {
    /// Enumerate every key currently in the store.
    fn list_keys(&self) -> Result<Vec<String>, StoreError>;

    /// Bulk-read the values for `keys`, in input order.
    fn read_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>, StoreError>;

    /// Write `value` under `key`, overwriting any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Succeeds whether or not the key exists.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}
