//! Date and locale keyed content cache
//!
//! Staleness is defined only by key mismatch: an entry is valid for the
//! calendar day and locale encoded in its key and is never expired by
//! age. A stored blob that fails to parse is discarded and reported as a
//! miss.
//!
//! Writes within one process are serialized, so a merge never loses a
//! concurrent merge's update. There is no cross-process locking; two
//! processes sharing a store may both miss and both generate.

use crate::content::types::{CacheEntry, CacheKey, DeepInsight, Locale, PostPatch};
use crate::error::{AstraiError, Result};
use crate::storage::KeyValueStore;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

/// Cache of generated content backed by a [`KeyValueStore`]
pub struct DailyContentCache {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    write_lock: Mutex<()>,
}

impl DailyContentCache {
    /// Create a cache writing keys under `namespace`
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Key of the slot for `(date, locale)`
    pub fn key(&self, date: NaiveDate, locale: Locale) -> CacheKey {
        CacheKey::new(self.namespace.clone(), date, locale)
    }

    /// Read the entry for `(date, locale)`
    ///
    /// # Errors
    ///
    /// Returns error only if the store itself fails. A corrupt blob is
    /// deleted and reported as `None`.
    pub fn get(&self, date: NaiveDate, locale: Locale) -> Result<Option<CacheEntry>> {
        let key = self.key(date, locale).to_string();
        self.read(&key)
    }

    /// Overwrite the entry for `(date, locale)`
    ///
    /// # Errors
    ///
    /// Returns error if the entry cannot be serialized or stored
    pub fn put(&self, date: NaiveDate, locale: Locale, entry: &CacheEntry) -> Result<()> {
        let key = self.key(date, locale).to_string();
        let _guard = self.lock()?;
        self.write(&key, entry)
    }

    /// Replace one post of the entry with a patched copy
    ///
    /// Loads the current entry, patches the post whose id is `post_id`,
    /// and writes the whole entry back. Sibling posts and the insight are
    /// carried over unchanged. Returns the stored entry, or `None` when
    /// there is no entry or no post with that id (nothing is written).
    ///
    /// # Errors
    ///
    /// Returns error if the store fails
    pub fn merge_post(
        &self,
        date: NaiveDate,
        locale: Locale,
        post_id: &str,
        patch: &PostPatch,
    ) -> Result<Option<CacheEntry>> {
        let key = self.key(date, locale).to_string();
        let _guard = self.lock()?;

        let Some(mut entry) = self.read(&key)? else {
            tracing::debug!("merge_post: no entry under {}", key);
            return Ok(None);
        };
        let Some(slot) = entry.posts.iter_mut().find(|p| p.id == post_id) else {
            tracing::debug!("merge_post: post {} not found under {}", post_id, key);
            return Ok(None);
        };
        *slot = patch.apply(slot);

        self.write(&key, &entry)?;
        tracing::debug!("Merged post {} into {}", post_id, key);
        Ok(Some(entry))
    }

    /// Attach a deep insight to the entry, leaving its posts untouched
    ///
    /// Returns the stored entry, or `None` when there is no entry.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails
    pub fn set_insight(
        &self,
        date: NaiveDate,
        locale: Locale,
        insight: DeepInsight,
    ) -> Result<Option<CacheEntry>> {
        let key = self.key(date, locale).to_string();
        let _guard = self.lock()?;

        let Some(mut entry) = self.read(&key)? else {
            return Ok(None);
        };
        entry.insight = Some(insight);
        self.write(&key, &entry)?;
        Ok(Some(entry))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| AstraiError::Storage("Content cache lock poisoned".to_string()).into())
    }

    fn read(&self, key: &str) -> Result<Option<CacheEntry>> {
        let Some(blob) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<CacheEntry>(&blob) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                tracing::warn!("Discarding corrupt cache entry {}: {}", key, e);
                self.store.delete(key)?;
                Ok(None)
            }
        }
    }

    fn write(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let blob = serde_json::to_string(entry)?;
        self.store.set(key, &blob)
    }
}
