//! Batched reads and writes of the persisted session record.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use futures::future::join_all;
use tracing::warn;

use crate::storage::{KeyValueStore, StorageResult};

use super::keys;
use super::record::{PendingSetup, SessionRecord, SessionUpdate};

/// Sliding-session window without "remember me": 24 hours, in milliseconds.
pub const SESSION_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// Sliding-session window with "remember me": 30 days, in milliseconds.
pub const REMEMBERED_SESSION_TTL_MS: u64 = 30 * 24 * 60 * 60 * 1000;

/// Absolute expiry for a session established or refreshed at `now_ms`.
#[must_use]
pub const fn expiry_for(remember_me: bool, now_ms: u64) -> u64 {
    now_ms
        + if remember_me {
            REMEMBERED_SESSION_TTL_MS
        } else {
            SESSION_TTL_MS
        }
}

/// Current wall-clock time in Unix epoch milliseconds.
#[must_use]
pub fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// Owns the persisted session schema: batched multi-key writes, a full
/// fan-out load, and the expiry computation.
///
/// Read failures never surface to callers: a field that cannot be read is a
/// field that is absent, which at worst forces re-authentication. Write
/// failures propagate so callers never treat an unpersisted login as signed
/// in.
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Creates a store over the platform key-value boundary.
    #[must_use]
    pub const fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Reads every session field concurrently and decodes the joined result.
    ///
    /// Per-field read errors are logged and degrade to "absent"; the join
    /// always completes over all keys before decoding.
    pub async fn load(&self) -> SessionRecord {
        let reads = keys::ALL_SESSION_KEYS.iter().map(|key| async move {
            match self.kv.get(key).await {
                Ok(value) => (*key, value),
                Err(err) => {
                    warn!(key, error = %err, "session field read failed; treating as absent");
                    (*key, None)
                }
            }
        });
        let raw: HashMap<String, String> = join_all(reads)
            .await
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
            .collect();
        SessionRecord::from_raw(&raw)
    }

    /// Writes the provided fields plus a fresh expiry, `rememberMe`, and the
    /// last-login timestamp in a single batch. Fields absent from `update`
    /// are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the batched write fails; nothing should be
    /// treated as persisted in that case.
    pub async fn save(
        &self,
        update: &SessionUpdate,
        remember_me: bool,
        now_ms: u64,
    ) -> StorageResult<()> {
        let mut pairs = update.to_pairs();
        pairs.push((
            keys::SESSION_EXPIRY.to_string(),
            expiry_for(remember_me, now_ms).to_string(),
        ));
        pairs.push((keys::REMEMBER_ME.to_string(), remember_me.to_string()));
        pairs.push((keys::LAST_LOGIN_AT.to_string(), now_ms.to_string()));
        self.kv.multi_set(&pairs).await
    }

    /// Removes every known key in one batch, incidental caches included.
    ///
    /// # Errors
    ///
    /// Returns an error if the batched removal fails.
    pub async fn clear(&self) -> StorageResult<()> {
        self.kv.multi_remove(keys::ALL_SESSION_KEYS).await
    }

    /// Rewrites only the expiry pair, extending a live session without
    /// touching identity fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the batched write fails.
    pub async fn touch_expiry(&self, remember_me: bool, now_ms: u64) -> StorageResult<()> {
        self.kv
            .multi_set(&[
                (
                    keys::SESSION_EXPIRY.to_string(),
                    expiry_for(remember_me, now_ms).to_string(),
                ),
                (keys::REMEMBER_ME.to_string(), remember_me.to_string()),
            ])
            .await
    }

    /// Persists or removes the setup-suspension marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or removal fails.
    pub async fn set_pending_setup(&self, pending: Option<PendingSetup>) -> StorageResult<()> {
        match pending {
            Some(pending) => {
                self.kv
                    .set(keys::PENDING_SETUP, &pending.to_string())
                    .await
            }
            None => self.kv.multi_remove(&[keys::PENDING_SETUP]).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::record::{Gender, Role};
    use crate::storage::MemoryKeyValueStore;

    fn store() -> (Arc<MemoryKeyValueStore>, SessionStore) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let session = SessionStore::new(Arc::clone(&kv) as Arc<dyn KeyValueStore>);
        (kv, session)
    }

    #[test]
    fn test_expiry_windows() {
        assert_eq!(expiry_for(false, 1_000), 1_000 + SESSION_TTL_MS);
        assert_eq!(expiry_for(true, 1_000), 1_000 + REMEMBERED_SESSION_TTL_MS);
        assert_eq!(SESSION_TTL_MS, 86_400_000);
        assert_eq!(REMEMBERED_SESSION_TTL_MS, 2_592_000_000);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let (_kv, store) = store();
        store
            .save(
                &SessionUpdate {
                    role: Some(Role::User),
                    couple_id: Some("C_010".to_string()),
                    user_gender: Some(Gender::Female),
                    ..SessionUpdate::default()
                },
                true,
                5_000,
            )
            .await
            .unwrap();

        let record = store.load().await;
        assert_eq!(record.role, Some(Role::User));
        assert_eq!(record.couple_id.as_deref(), Some("C_010"));
        assert_eq!(record.session_expiry, Some(5_000 + REMEMBERED_SESSION_TTL_MS));
        assert!(record.remember_me);
    }

    #[tokio::test]
    async fn test_sparse_save_preserves_other_fields() {
        let (kv, store) = store();
        store
            .save(
                &SessionUpdate {
                    role: Some(Role::User),
                    couple_id: Some("C_010".to_string()),
                    ..SessionUpdate::default()
                },
                false,
                1_000,
            )
            .await
            .unwrap();

        // Second login supplies only the profile id.
        store
            .save(
                &SessionUpdate {
                    user_id: Some("C_010_F".to_string()),
                    ..SessionUpdate::default()
                },
                false,
                2_000,
            )
            .await
            .unwrap();

        let record = store.load().await;
        assert_eq!(record.couple_id.as_deref(), Some("C_010"));
        assert_eq!(record.user_id.as_deref(), Some("C_010_F"));
        assert_eq!(kv.raw_get(keys::LAST_LOGIN_AT).as_deref(), Some("2000"));
    }

    #[tokio::test]
    async fn test_clear_removes_incidental_caches() {
        let (kv, store) = store();
        store
            .save(&SessionUpdate::default(), false, 1_000)
            .await
            .unwrap();
        kv.raw_set(keys::CACHED_AVATAR, "https://cdn.example/avatar.png");

        store.clear().await.unwrap();
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn test_load_is_fail_closed() {
        let (kv, store) = store();
        kv.raw_set(keys::USER_ROLE, "user");
        kv.set_fail_reads(true);

        let record = store.load().await;
        assert_eq!(record, SessionRecord::default());
    }

    #[tokio::test]
    async fn test_touch_expiry_leaves_identity_untouched() {
        let (kv, store) = store();
        store
            .save(
                &SessionUpdate {
                    role: Some(Role::Admin),
                    admin_uid: Some("A_1".to_string()),
                    ..SessionUpdate::default()
                },
                false,
                1_000,
            )
            .await
            .unwrap();

        store.touch_expiry(true, 2_000).await.unwrap();

        let record = store.load().await;
        assert_eq!(record.admin_uid.as_deref(), Some("A_1"));
        assert_eq!(record.session_expiry, Some(2_000 + REMEMBERED_SESSION_TTL_MS));
        assert!(record.remember_me);
        // Last-login is only written by save().
        assert_eq!(kv.raw_get(keys::LAST_LOGIN_AT).as_deref(), Some("1000"));
    }

    #[tokio::test]
    async fn test_pending_setup_set_and_cleared() {
        let (kv, store) = store();
        store
            .set_pending_setup(Some(PendingSetup::PinSetup))
            .await
            .unwrap();
        assert_eq!(kv.raw_get(keys::PENDING_SETUP).as_deref(), Some("pin-setup"));

        store.set_pending_setup(None).await.unwrap();
        assert_eq!(kv.raw_get(keys::PENDING_SETUP), None);
    }
}
