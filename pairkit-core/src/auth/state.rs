//! The in-memory authentication snapshot.

use serde::Serialize;

use crate::session::{Gender, PendingSetup, Role, SessionRecord};

/// Immutable snapshot of the authentication state, derived from the
/// persisted [`SessionRecord`] and published to consumers through a watch
/// channel.
///
/// The route guard only ever reads this; it is rebuilt in full on login,
/// logout, refresh, and expiry changes, never partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthState {
    /// Whether the session satisfies the validity invariant: role present,
    /// an identity anchor present (or profile selection in progress), and
    /// expiry not passed.
    pub is_authenticated: bool,
    /// True only during the initial load window. No routing decision may be
    /// made while this is set.
    pub is_loading: bool,
    /// Role of the signed-in actor.
    pub role: Option<Role>,
    /// Setup-suspension marker; the guard stands down while this is set.
    pub pending_setup: Option<PendingSetup>,
    /// Household identifier.
    pub couple_id: Option<String>,
    /// Member gender.
    pub user_gender: Option<Gender>,
    /// Individual profile identifier.
    pub user_id: Option<String>,
    /// Member display name.
    pub user_name: Option<String>,
    /// Admin account identifier.
    pub admin_uid: Option<String>,
    /// Admin email address.
    pub admin_email: Option<String>,
    /// Admin display name.
    pub admin_name: Option<String>,
    /// Super-admin flag, preserved distinctly for permission gating deeper
    /// in the app.
    pub is_super_admin: bool,
}

impl AuthState {
    /// The state published before the first load completes.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
            role: None,
            pending_setup: None,
            couple_id: None,
            user_gender: None,
            user_id: None,
            user_name: None,
            admin_uid: None,
            admin_email: None,
            admin_name: None,
            is_super_admin: false,
        }
    }

    /// The unauthenticated default every logout converges to.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            is_authenticated: false,
            is_loading: false,
            role: None,
            pending_setup: None,
            couple_id: None,
            user_gender: None,
            user_id: None,
            user_name: None,
            admin_uid: None,
            admin_email: None,
            admin_name: None,
            is_super_admin: false,
        }
    }

    /// Derives the snapshot from a persisted record at `now_ms`.
    ///
    /// An invalid or expired record yields the unauthenticated default, but
    /// the setup-suspension marker is carried either way, since external
    /// flows may suspend the guard before the actor is authenticated.
    #[must_use]
    pub fn from_record(record: &SessionRecord, now_ms: u64) -> Self {
        if !record.has_valid_session(now_ms) {
            return Self {
                pending_setup: record.pending_setup,
                ..Self::unauthenticated()
            };
        }
        Self {
            is_authenticated: true,
            is_loading: false,
            role: record.role,
            pending_setup: record.pending_setup,
            couple_id: record.couple_id.clone(),
            user_gender: record.user_gender,
            user_id: record.user_id.clone(),
            user_name: record.user_name.clone(),
            admin_uid: record.admin_uid.clone(),
            admin_email: record.admin_email.clone(),
            admin_name: record.admin_name.clone(),
            is_super_admin: record.is_super_admin,
        }
    }

    /// Whether the role is admin-class (`admin`, `superadmin`, `owner`).
    #[must_use]
    pub fn is_admin_role(&self) -> bool {
        self.role.is_some_and(Role::is_admin_class)
    }

    /// Whether the role is the member role.
    #[must_use]
    pub fn is_user_role(&self) -> bool {
        self.role.is_some_and(Role::is_user)
    }

    /// The partial-auth state: the actor has proven which household they
    /// belong to but has not yet picked and unlocked an individual profile.
    #[must_use]
    pub fn in_profile_selection(&self) -> bool {
        self.is_authenticated
            && self.is_user_role()
            && self.couple_id.is_some()
            && self.user_id.is_none()
    }
}
