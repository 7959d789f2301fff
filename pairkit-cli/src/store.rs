//! File-backed key-value store for the developer CLI.
//!
//! A single JSON object on disk, rewritten atomically (temp file + rename)
//! on every mutation. Durability and contention are not concerns here; this
//! exists so CLI invocations see each other's session state the way app
//! restarts see the platform store.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use pairkit_core::{KeyValueStore, StorageError, StorageResult};

/// JSON-file [`KeyValueStore`].
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store over `path`. The file is created lazily on first
    /// write; a missing file reads as an empty store.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_map(&self) -> StorageResult<HashMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| StorageError::Read(format!("corrupt store file: {err}"))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(StorageError::Read(err.to_string())),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| StorageError::Write(err.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(map)
            .map_err(|err| StorageError::Write(err.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|err| StorageError::Write(err.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|err| StorageError::Write(err.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> StorageResult<()> {
        let mut map = self.read_map()?;
        for (key, value) in pairs {
            map.insert(key.clone(), value.clone());
        }
        self.write_map(&map)
    }

    async fn multi_remove(&self, keys: &[&str]) -> StorageResult<()> {
        let mut map = self.read_map()?;
        for key in keys {
            map.remove(*key);
        }
        self.write_map(&map)
    }
}
