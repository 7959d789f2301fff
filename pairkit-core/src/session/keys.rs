//! Persisted key names for the session record.
//!
//! The key strings are the on-device wire format; they must not change
//! without a migration.

/// Role of the signed-in actor (`user|admin|superadmin|owner`).
pub const USER_ROLE: &str = "userRole";

/// Household identifier shared by both members of a couple.
pub const COUPLE_ID: &str = "coupleId";

/// Member gender (`male|female`).
pub const USER_GENDER: &str = "userGender";

/// Individual profile identifier within a household.
pub const USER_ID: &str = "userId";

/// Display name of the member.
pub const USER_NAME: &str = "userName";

/// Admin account identifier.
pub const ADMIN_UID: &str = "adminUid";

/// Admin email address.
pub const ADMIN_EMAIL: &str = "adminEmail";

/// Admin display name.
pub const ADMIN_NAME: &str = "adminName";

/// Stringified boolean super-admin flag.
pub const IS_SUPER_ADMIN: &str = "isSuperAdmin";

/// Absolute expiry as stringified epoch milliseconds.
pub const SESSION_EXPIRY: &str = "sessionExpiry";

/// Stringified boolean selecting the 30-day expiry window.
pub const REMEMBER_ME: &str = "rememberMe";

/// Marker set by external flows (`password-reset|pin-setup`) that suspends
/// route protection while present.
pub const PENDING_SETUP: &str = "pendingSetup";

/// Marker: a household was chosen but no profile unlocked yet.
pub const PENDING_PROFILE_SELECTION: &str = "pendingProfileSelection";

/// Marker: the quick-access variant of the profile-selection flow.
pub const QUICK_ACCESS_MODE: &str = "quickAccessMode";

/// Incidental cache: epoch milliseconds of the last successful login.
pub const LAST_LOGIN_AT: &str = "lastLoginAt";

/// Incidental cache: avatar URL written by the profile screens.
pub const CACHED_AVATAR: &str = "cachedAvatar";

/// Every key the session layer may touch, incidental caches included, so
/// `clear()` leaves nothing behind for the next session to inherit.
pub const ALL_SESSION_KEYS: &[&str] = &[
    USER_ROLE,
    COUPLE_ID,
    USER_GENDER,
    USER_ID,
    USER_NAME,
    ADMIN_UID,
    ADMIN_EMAIL,
    ADMIN_NAME,
    IS_SUPER_ADMIN,
    SESSION_EXPIRY,
    REMEMBER_ME,
    PENDING_SETUP,
    PENDING_PROFILE_SELECTION,
    QUICK_ACCESS_MODE,
    LAST_LOGIN_AT,
    CACHED_AVATAR,
];
