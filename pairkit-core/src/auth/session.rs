//! The auth facade: the public API screens call.
//!
//! Wires the session store and the in-memory state together and publishes
//! every change through a watch channel the route guard subscribes to. All
//! operations serialize on an internal mutex, so overlapping `login` and
//! `logout` calls cannot interleave their storage writes with their state
//! updates.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::guard::{targets, Navigator};
use crate::session::{
    current_epoch_ms, expiry_for, PendingSetup, SessionRecord, SessionStore, SessionUpdate,
};
use crate::storage::{KeyValueStore, StorageResult};

use super::state::AuthState;

/// Owns the session lifecycle: load at startup, login/logout, expiry
/// refresh, and the published [`AuthState`].
pub struct AuthSession {
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    record: Mutex<SessionRecord>,
    state_tx: watch::Sender<AuthState>,
}

impl AuthSession {
    /// Creates a facade over the platform store. The published state starts
    /// in the loading window until [`initialize`](Self::initialize) runs.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, navigator: Arc<dyn Navigator>) -> Self {
        let (state_tx, _) = watch::channel(AuthState::loading());
        Self {
            store: SessionStore::new(kv),
            navigator,
            record: Mutex::new(SessionRecord::default()),
            state_tx,
        }
    }

    /// Read-only reactive view of the auth state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    /// Current snapshot of the auth state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    /// Runs once at process start: loads the persisted record, evaluates
    /// expiry before trusting any other field, and clears the loading flag
    /// as the final step. Never fails; a broken store degrades to an
    /// unauthenticated state.
    pub async fn initialize(&self) {
        self.reload(current_epoch_ms()).await;
    }

    /// Forces a full reload from storage after out-of-band changes to
    /// identity fields. Does not re-enter the loading window.
    pub async fn refresh_auth_state(&self) {
        self.reload(current_epoch_ms()).await;
    }

    async fn reload(&self, now_ms: u64) {
        let mut record = self.record.lock().await;
        let mut loaded = self.store.load().await;

        let expired = loaded
            .session_expiry
            .is_some_and(|expiry| now_ms >= expiry);
        if expired && loaded.is_present() {
            debug!("stored session expired; clearing");
            if let Err(err) = self.store.clear().await {
                warn!(error = %err, "best-effort clear of expired session failed");
            }
            loaded = SessionRecord::default();
        }

        *record = loaded;
        self.state_tx
            .send_replace(AuthState::from_record(&record, now_ms));
    }

    /// Merges the given fields into the persisted record, then optimistically
    /// updates the in-memory state to match, without a re-read from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the batched write fails; the published state is
    /// left untouched so the caller never appears signed in on a failed
    /// write.
    pub async fn login(&self, update: SessionUpdate, remember_me: bool) -> StorageResult<()> {
        let mut record = self.record.lock().await;
        let now_ms = current_epoch_ms();
        self.store.save(&update, remember_me, now_ms).await?;

        update.apply(&mut record);
        record.session_expiry = Some(expiry_for(remember_me, now_ms));
        record.remember_me = remember_me;
        self.state_tx
            .send_replace(AuthState::from_record(&record, now_ms));
        Ok(())
    }

    /// Clears the persisted record, resets the state to the unauthenticated
    /// default, and replaces the current location with the login screen.
    ///
    /// Idempotent, and the universal escape hatch from any broken state: the
    /// in-memory reset and the navigation happen even when the storage clear
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns the storage error from the clear, after the state reset.
    pub async fn logout(&self) -> StorageResult<()> {
        let mut record = self.record.lock().await;
        let result = self.store.clear().await;

        *record = SessionRecord::default();
        self.state_tx
            .send_replace(AuthState::from_record(&record, current_epoch_ms()));
        self.navigator.replace(targets::LOGIN);
        result
    }

    /// Extends a live session (e.g. after a step-up verification) without
    /// touching identity fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry write fails; the in-memory state is
    /// left untouched.
    pub async fn set_session_expiry(&self, remember_me: bool) -> StorageResult<()> {
        let mut record = self.record.lock().await;
        let now_ms = current_epoch_ms();
        self.store.touch_expiry(remember_me, now_ms).await?;

        record.session_expiry = Some(expiry_for(remember_me, now_ms));
        record.remember_me = remember_me;
        self.state_tx
            .send_replace(AuthState::from_record(&record, now_ms));
        Ok(())
    }

    /// Sets or clears the setup-suspension marker on behalf of an external
    /// flow (password reset, PIN setup). While set, the route guard stands
    /// down entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be persisted; the in-memory
    /// state is left untouched.
    pub async fn set_pending_setup(&self, pending: Option<PendingSetup>) -> StorageResult<()> {
        let mut record = self.record.lock().await;
        self.store.set_pending_setup(pending).await?;

        record.pending_setup = pending;
        self.state_tx
            .send_replace(AuthState::from_record(&record, current_epoch_ms()));
        Ok(())
    }

    /// Whether the current role is admin-class.
    #[must_use]
    pub fn is_admin_role(&self) -> bool {
        self.state_tx.borrow().is_admin_role()
    }

    /// Whether the current role is the member role.
    #[must_use]
    pub fn is_user_role(&self) -> bool {
        self.state_tx.borrow().is_user_role()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::RecordingNavigator;
    use crate::session::keys;
    use crate::session::Role;
    use crate::storage::MemoryKeyValueStore;

    fn session() -> (Arc<MemoryKeyValueStore>, Arc<RecordingNavigator>, AuthSession) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let session = AuthSession::new(
            Arc::clone(&kv) as Arc<dyn KeyValueStore>,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        );
        (kv, navigator, session)
    }

    fn user_login() -> SessionUpdate {
        SessionUpdate {
            role: Some(Role::User),
            couple_id: Some("C_010".to_string()),
            user_id: Some("C_010_F".to_string()),
            ..SessionUpdate::default()
        }
    }

    #[tokio::test]
    async fn test_initialize_clears_loading() {
        let (_kv, _nav, session) = session();
        assert!(session.state().is_loading);
        session.initialize().await;
        assert!(!session.state().is_loading);
        assert!(!session.state().is_authenticated);
    }

    #[tokio::test]
    async fn test_initialize_clears_expired_session() {
        let (kv, _nav, session) = session();
        kv.raw_set(keys::USER_ROLE, "user");
        kv.raw_set(keys::USER_ID, "C_010_F");
        kv.raw_set(keys::COUPLE_ID, "C_010");
        kv.raw_set(keys::SESSION_EXPIRY, "1");

        session.initialize().await;
        assert!(!session.state().is_authenticated);
        // Expiry is checked before any other field is trusted; the stale
        // record is gone from storage too.
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn test_login_is_optimistic_but_write_gated() {
        let (kv, _nav, session) = session();
        session.initialize().await;

        kv.set_fail_writes(true);
        assert!(session.login(user_login(), false).await.is_err());
        assert!(!session.state().is_authenticated);

        kv.set_fail_writes(false);
        session.login(user_login(), false).await.unwrap();
        let state = session.state();
        assert!(state.is_authenticated);
        assert_eq!(state.user_id.as_deref(), Some("C_010_F"));
        assert!(session.is_user_role());
    }

    #[tokio::test]
    async fn test_login_refresh_round_trip() {
        let (_kv, _nav, session) = session();
        session.initialize().await;
        session.login(user_login(), true).await.unwrap();
        let optimistic = session.state();

        session.refresh_auth_state().await;
        let reloaded = session.state();
        assert_eq!(optimistic.role, reloaded.role);
        assert_eq!(optimistic.couple_id, reloaded.couple_id);
        assert_eq!(optimistic.user_id, reloaded.user_id);
        assert_eq!(optimistic.is_authenticated, reloaded.is_authenticated);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent_and_navigates() {
        let (_kv, navigator, session) = session();
        session.initialize().await;
        session.login(user_login(), false).await.unwrap();

        session.logout().await.unwrap();
        session.logout().await.unwrap();
        assert_eq!(session.state(), AuthState::unauthenticated());
        assert_eq!(navigator.paths(), vec![targets::LOGIN, targets::LOGIN]);
    }

    #[tokio::test]
    async fn test_logout_resets_state_even_when_clear_fails() {
        let (kv, navigator, session) = session();
        session.initialize().await;
        session.login(user_login(), false).await.unwrap();

        kv.set_fail_writes(true);
        assert!(session.logout().await.is_err());
        assert!(!session.state().is_authenticated);
        assert_eq!(navigator.paths(), vec![targets::LOGIN]);
    }

    #[tokio::test]
    async fn test_set_session_expiry_extends_window() {
        let (kv, _nav, session) = session();
        session.initialize().await;
        session.login(user_login(), false).await.unwrap();

        session.set_session_expiry(true).await.unwrap();
        assert_eq!(kv.raw_get(keys::REMEMBER_ME).as_deref(), Some("true"));
        assert!(session.state().is_authenticated);
    }

    #[tokio::test]
    async fn test_watchers_observe_transitions() {
        let (_kv, _nav, session) = session();
        let mut rx = session.subscribe();
        assert!(rx.borrow().is_loading);

        session.initialize().await;
        rx.changed().await.unwrap();
        assert!(!rx.borrow().is_loading);

        session.login(user_login(), false).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_authenticated);
    }
}
