//! In-memory key-value store for tests and tooling.
//!
//! Not durable across restarts; intended for unit and integration testing of
//! the session layer. Failure injection switches let tests exercise the
//! fail-closed paths without a broken platform store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::error::{StorageError, StorageResult};
use super::traits::KeyValueStore;

/// Thread-safe in-memory [`KeyValueStore`] backed by a `HashMap`.
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryKeyValueStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent read fail until switched off again.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent write and removal fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the value stored under `key`, bypassing failure
    /// injection. Useful for asserting on raw persisted fields.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn raw_get(&self, key: &str) -> Option<String> {
        self.entries.read().expect("lock poisoned").get(key).cloned()
    }

    /// Inserts a raw value, bypassing failure injection. Useful for seeding
    /// persisted state in tests.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn raw_set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), value.to_string());
    }
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Read(format!("injected failure for {key}")));
        }
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write(format!("injected failure for {key}")));
        }
        self.entries
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write("injected batch failure".to_string()));
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        for (key, value) in pairs {
            entries.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Remove("injected batch failure".to_string()));
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_round_trip() {
        let store = MemoryKeyValueStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("userRole").await.unwrap(), None);

        store.set("userRole", "user").await.unwrap();
        assert_eq!(store.get("userRole").await.unwrap().as_deref(), Some("user"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_multi_set_and_remove_batches() {
        let store = MemoryKeyValueStore::new();
        store
            .multi_set(&[
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
            ])
            .await
            .unwrap();
        assert_eq!(store.len(), 3);

        store.multi_remove(&["a", "c", "missing"]).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryKeyValueStore::new();
        store.set("k", "v").await.unwrap();

        store.set_fail_reads(true);
        assert!(store.get("k").await.is_err());
        store.set_fail_reads(false);
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.set_fail_writes(true);
        assert!(store.set("k", "w").await.is_err());
        assert!(store.multi_remove(&["k"]).await.is_err());
        // Stored value untouched by the failed operations.
        assert_eq!(store.raw_get("k").as_deref(), Some("v"));
    }
}
