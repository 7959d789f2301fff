//! Reactive wrapper that applies the policy to the live auth state.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::debug;

use crate::auth::AuthState;

use super::policy::{decide, GuardAction, GuardPhase};
use super::route::RouteLocation;

/// Host navigation boundary.
///
/// The guard only ever replaces the current location, never pushes onto a
/// history stack. Replace semantics prevent back-button loops into
/// disallowed screens.
pub trait Navigator: Send + Sync {
    /// Replaces the current location with `path`.
    fn replace(&self, path: &str);
}

/// Evaluates the route policy against the current auth snapshot whenever the
/// location or the auth state changes.
pub struct RouteGuard {
    auth_rx: watch::Receiver<AuthState>,
    navigator: Arc<dyn Navigator>,
}

impl RouteGuard {
    /// Creates a guard over a subscription to the auth state.
    #[must_use]
    pub const fn new(auth_rx: watch::Receiver<AuthState>, navigator: Arc<dyn Navigator>) -> Self {
        Self { auth_rx, navigator }
    }

    /// Evaluates `path` against the current snapshot, issuing the
    /// replace-navigation when the policy redirects. Returns the action
    /// taken.
    #[must_use]
    pub fn evaluate(&self, path: &str) -> GuardAction {
        let location = RouteLocation::parse(path);
        let phase = GuardPhase::from_state(&self.auth_rx.borrow());
        let action = decide(phase, &location);
        if let GuardAction::Redirect(target) = action {
            debug!(path, target, "route guard redirect");
            self.navigator.replace(target);
        }
        action
    }

    /// Drives the guard from a stream of locations: re-evaluates on every
    /// location change and on every auth-state change, until either side
    /// hangs up.
    pub async fn run(mut self, mut location_rx: watch::Receiver<String>) {
        loop {
            let path = location_rx.borrow_and_update().clone();
            let _action = self.evaluate(&path);
            tokio::select! {
                changed = self.auth_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = location_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// A [`Navigator`] that records every replace it is asked to perform.
///
/// Used by tests and by the developer CLI to report where a navigation
/// would have gone.
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Creates an empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            paths: Mutex::new(Vec::new()),
        }
    }

    /// Every path replaced so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().expect("lock poisoned").clone()
    }

    /// The most recent replacement, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.paths.lock().expect("lock poisoned").last().cloned()
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        self.paths.lock().expect("lock poisoned").push(path.to_string());
    }
}
