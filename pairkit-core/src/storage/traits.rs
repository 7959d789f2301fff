//! Platform interface for persisted session fields.

use async_trait::async_trait;

use super::error::StorageResult;

/// Asynchronous key-value store that survives app restarts.
///
/// Values are plain strings; the session layer owns all encoding (stringified
/// booleans, epoch-millisecond timestamps). Keys are independently settable
/// and removable. Batched operations are atomic at the store's granularity;
/// callers must not depend on partial application.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Writes every `(key, value)` pair in one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch cannot be written.
    async fn multi_set(&self, pairs: &[(String, String)]) -> StorageResult<()>;

    /// Removes every key in `keys` in one batch. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch cannot be removed.
    async fn multi_remove(&self, keys: &[&str]) -> StorageResult<()>;
}
