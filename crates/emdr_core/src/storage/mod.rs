//! Key-value persistence contract and backends.
//!
//! # Responsibility
//! - Define the minimal get/set/remove interface the state store writes to.
//! - Provide an in-memory backend for tests and storage-less hosts.
//! - Provide a SQLite backend for native hosts.
//!
//! # Invariants
//! - A `set` either stores the whole value or fails; readers never observe
//!   partial writes.
//! - Backends report failures as `StorageError`; they never panic.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[cfg(not(target_arch = "wasm32"))]
mod sqlite;

#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::SqliteStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend-level storage failure.
#[derive(Debug)]
pub enum StorageError {
    /// Storage is disabled or cannot be reached.
    Unavailable(String),
    /// Write would exceed the backend's capacity.
    QuotaExceeded { key: String, bytes: usize },
    /// Any other backend failure, already rendered to text.
    Backend(String),
    #[cfg(not(target_arch = "wasm32"))]
    Db(crate::db::DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(details) => write!(f, "storage unavailable: {details}"),
            Self::QuotaExceeded { key, bytes } => {
                write!(f, "storage quota exceeded writing {bytes} bytes to `{key}`")
            }
            Self::Backend(details) => write!(f, "storage backend error: {details}"),
            #[cfg(not(target_arch = "wasm32"))]
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<crate::db::DbError> for StorageError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Db(value)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(crate::db::DbError::Sqlite(value))
    }
}

/// String-keyed durable storage, shaped after browser `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// In-memory backend with optional byte quota.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes once keys + values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    bytes: value.len(),
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
