//! Key-value storage backing the daily content cache
//!
//! The cache only needs string keys and opaque string blobs. Two
//! implementations are provided: an in-memory map for tests and ephemeral
//! runs, and an embedded `sled` database for persistence across runs.

use crate::error::{AstraiError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// Minimal key-value store interface
///
/// Implementations must be safe to share between tasks.
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `AstraiError::Storage` if the backend cannot be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns `AstraiError::Storage` if the backend cannot be written
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns `AstraiError::Storage` if the backend cannot be written
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> AstraiError {
    AstraiError::Storage("Memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

/// Persistent store using an embedded `sled` database
///
/// Every write is flushed before returning.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open or create a store
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the database directory
    ///
    /// # Errors
    ///
    /// Returns `AstraiError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use astrai::storage::{KeyValueStore, SledStore};
    ///
    /// # fn main() -> astrai::error::Result<()> {
    /// let dir = tempfile::TempDir::new()?;
    /// let store = SledStore::open(dir.path().join("cache.db"))?;
    /// store.set("k", "v")?;
    /// assert_eq!(store.get("k")?, Some("v".to_string()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            AstraiError::Storage(format!("Failed to open database {}: {}", path.display(), e))
        })?;
        tracing::debug!("Opened content store at {}", path.display());
        Ok(Self { db })
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| AstraiError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| AstraiError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => match std::str::from_utf8(&bytes) {
                Ok(value) => Ok(Some(value.to_string())),
                Err(e) => {
                    // Invalid bytes surface as replacement characters so
                    // callers see a corrupt value rather than a read failure
                    tracing::warn!("Stored value under {} is not UTF-8: {}", key, e);
                    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
                }
            },
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| AstraiError::Storage(format!("Insert failed: {}", e)))?;
        self.flush()
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| AstraiError::Storage(format!("Remove failed: {}", e)))?;
        self.flush()
    }
}
