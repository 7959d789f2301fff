//! Typed session record and its string codec.
//!
//! The persisted store is string-keyed and loosely typed; every stringified
//! boolean and epoch timestamp is encoded and decoded here, centrally, so the
//! rest of the crate only sees typed optional fields.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use super::keys;

/// Role of the authenticated actor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A household member using the user experience.
    User,
    /// An administrator.
    Admin,
    /// An administrator with elevated permissions.
    SuperAdmin,
    /// The owning administrator account.
    Owner,
}

impl Role {
    /// `admin`, `superadmin` and `owner` are all admin-class for routing;
    /// they differ only in downstream permission scope.
    #[must_use]
    pub const fn is_admin_class(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin | Self::Owner)
    }

    /// Returns `true` for the member role.
    #[must_use]
    pub const fn is_user(self) -> bool {
        matches!(self, Self::User)
    }
}

/// Member gender recorded at profile setup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male member profile.
    Male,
    /// Female member profile.
    Female,
}

/// Marker set by external flows that must suspend normal route protection.
///
/// The flag is cleared by the flow itself when it completes; the route guard
/// only reads it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PendingSetup {
    /// An admin password-reset flow is in progress.
    PasswordReset,
    /// A member PIN-setup flow is in progress.
    PinSetup,
}

/// The full set of persisted fields describing an authentication session.
///
/// All fields are optional at rest; user and admin identity fields coexist
/// without collision because writes are sparse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SessionRecord {
    /// Role of the signed-in actor.
    pub role: Option<Role>,
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
    /// Super-admin flag.
    pub is_super_admin: bool,
    /// Absolute expiry in epoch milliseconds.
    pub session_expiry: Option<u64>,
    /// Whether the 30-day expiry window was applied.
    pub remember_me: bool,
    /// Marker suspending route protection while an external flow runs.
    pub pending_setup: Option<PendingSetup>,
    /// Marker: household chosen, profile not yet unlocked.
    pub pending_profile_selection: bool,
    /// Marker: quick-access variant of the profile-selection flow.
    pub quick_access_mode: bool,
}

impl SessionRecord {
    /// Decodes a record from raw persisted fields.
    ///
    /// Unknown keys are ignored; malformed values decode as absent. Absence
    /// is always safe: it forces re-authentication.
    #[must_use]
    pub fn from_raw(raw: &HashMap<String, String>) -> Self {
        Self {
            role: parse_enum(raw, keys::USER_ROLE),
            couple_id: raw.get(keys::COUPLE_ID).cloned(),
            user_gender: parse_enum(raw, keys::USER_GENDER),
            user_id: raw.get(keys::USER_ID).cloned(),
            user_name: raw.get(keys::USER_NAME).cloned(),
            admin_uid: raw.get(keys::ADMIN_UID).cloned(),
            admin_email: raw.get(keys::ADMIN_EMAIL).cloned(),
            admin_name: raw.get(keys::ADMIN_NAME).cloned(),
            is_super_admin: parse_bool(raw, keys::IS_SUPER_ADMIN),
            session_expiry: parse_epoch_ms(raw, keys::SESSION_EXPIRY),
            remember_me: parse_bool(raw, keys::REMEMBER_ME),
            pending_setup: parse_enum(raw, keys::PENDING_SETUP),
            pending_profile_selection: parse_bool(raw, keys::PENDING_PROFILE_SELECTION),
            quick_access_mode: parse_bool(raw, keys::QUICK_ACCESS_MODE),
        }
    }

    /// Whether the record describes a session that may be trusted at
    /// `now_ms`: a role is present, some identity anchors it (a user id, an
    /// admin id, or a user-role household awaiting profile selection), and
    /// the stored expiry has not passed. A missing expiry is treated as
    /// expired.
    #[must_use]
    pub fn has_valid_session(&self, now_ms: u64) -> bool {
        let Some(role) = self.role else {
            return false;
        };
        let has_identity = self.user_id.is_some()
            || self.admin_uid.is_some()
            || (role.is_user() && self.couple_id.is_some());
        let live = self.session_expiry.is_some_and(|expiry| now_ms < expiry);
        has_identity && live
    }

    /// Whether any session fields are present at all, expired or not. Used
    /// to decide if an expired load warrants a full clear.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.role.is_some()
            || self.user_id.is_some()
            || self.admin_uid.is_some()
            || self.couple_id.is_some()
    }
}

/// Sparse write set merged into the session record by `login`.
///
/// Absent fields are never written, so a follow-up login can supply just the
/// missing pieces (e.g. a `user_id` after profile selection) without
/// disturbing what is already stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    /// Role to record.
    pub role: Option<Role>,
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
    /// Super-admin flag.
    pub is_super_admin: Option<bool>,
    /// Profile-selection marker.
    pub pending_profile_selection: Option<bool>,
    /// Quick-access marker.
    pub quick_access_mode: Option<bool>,
}

impl SessionUpdate {
    /// Encodes the provided fields as `(key, value)` pairs for a batched
    /// write. Absent fields produce no pair.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(role) = self.role {
            pairs.push((keys::USER_ROLE.to_string(), role.to_string()));
        }
        if let Some(couple_id) = &self.couple_id {
            pairs.push((keys::COUPLE_ID.to_string(), couple_id.clone()));
        }
        if let Some(gender) = self.user_gender {
            pairs.push((keys::USER_GENDER.to_string(), gender.to_string()));
        }
        if let Some(user_id) = &self.user_id {
            pairs.push((keys::USER_ID.to_string(), user_id.clone()));
        }
        if let Some(user_name) = &self.user_name {
            pairs.push((keys::USER_NAME.to_string(), user_name.clone()));
        }
        if let Some(admin_uid) = &self.admin_uid {
            pairs.push((keys::ADMIN_UID.to_string(), admin_uid.clone()));
        }
        if let Some(admin_email) = &self.admin_email {
            pairs.push((keys::ADMIN_EMAIL.to_string(), admin_email.clone()));
        }
        if let Some(admin_name) = &self.admin_name {
            pairs.push((keys::ADMIN_NAME.to_string(), admin_name.clone()));
        }
        if let Some(is_super_admin) = self.is_super_admin {
            pairs.push((keys::IS_SUPER_ADMIN.to_string(), is_super_admin.to_string()));
        }
        if self.pending_profile_selection == Some(true) {
            pairs.push((keys::PENDING_PROFILE_SELECTION.to_string(), "true".to_string()));
        }
        if self.quick_access_mode == Some(true) {
            pairs.push((keys::QUICK_ACCESS_MODE.to_string(), "true".to_string()));
        }
        pairs
    }

    /// Merges the provided fields into `record`, leaving absent fields as
    /// they were. Mirrors the sparse persisted write for the optimistic
    /// in-memory update after `login`.
    pub fn apply(&self, record: &mut SessionRecord) {
        if let Some(role) = self.role {
            record.role = Some(role);
        }
        if let Some(couple_id) = &self.couple_id {
            record.couple_id = Some(couple_id.clone());
        }
        if let Some(gender) = self.user_gender {
            record.user_gender = Some(gender);
        }
        if let Some(user_id) = &self.user_id {
            record.user_id = Some(user_id.clone());
        }
        if let Some(user_name) = &self.user_name {
            record.user_name = Some(user_name.clone());
        }
        if let Some(admin_uid) = &self.admin_uid {
            record.admin_uid = Some(admin_uid.clone());
        }
        if let Some(admin_email) = &self.admin_email {
            record.admin_email = Some(admin_email.clone());
        }
        if let Some(admin_name) = &self.admin_name {
            record.admin_name = Some(admin_name.clone());
        }
        if let Some(is_super_admin) = self.is_super_admin {
            record.is_super_admin = is_super_admin;
        }
        if let Some(pending) = self.pending_profile_selection {
            record.pending_profile_selection = pending;
        }
        if let Some(quick) = self.quick_access_mode {
            record.quick_access_mode = quick;
        }
    }
}

fn parse_enum<T: FromStr>(raw: &HashMap<String, String>, key: &str) -> Option<T> {
    let value = raw.get(key)?;
    match T::from_str(value) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, value, "malformed session field; treating as absent");
            None
        }
    }
}

fn parse_bool(raw: &HashMap<String, String>, key: &str) -> bool {
    raw.get(key).is_some_and(|value| value == "true")
}

fn parse_epoch_ms(raw: &HashMap<String, String>, key: &str) -> Option<u64> {
    let value = raw.get(key)?;
    match value.parse::<u64>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, value, "malformed timestamp; treating as absent");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fields: &[(&str, &str)]) -> HashMap<String, String> {
        fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_decode_user_session() {
        let record = SessionRecord::from_raw(&raw(&[
            (keys::USER_ROLE, "user"),
            (keys::COUPLE_ID, "C_010"),
            (keys::USER_GENDER, "female"),
            (keys::USER_ID, "C_010_F"),
            (keys::SESSION_EXPIRY, "1700000000000"),
            (keys::REMEMBER_ME, "true"),
        ]));
        assert_eq!(record.role, Some(Role::User));
        assert_eq!(record.couple_id.as_deref(), Some("C_010"));
        assert_eq!(record.user_gender, Some(Gender::Female));
        assert_eq!(record.session_expiry, Some(1_700_000_000_000));
        assert!(record.remember_me);
        assert!(!record.is_super_admin);
    }

    #[test]
    fn test_malformed_fields_decode_as_absent() {
        let record = SessionRecord::from_raw(&raw(&[
            (keys::USER_ROLE, "root"),
            (keys::SESSION_EXPIRY, "not-a-number"),
            (keys::IS_SUPER_ADMIN, "yes"),
        ]));
        assert_eq!(record.role, None);
        assert_eq!(record.session_expiry, None);
        assert!(!record.is_super_admin);
    }

    #[test]
    fn test_admin_class_roles() {
        assert!(Role::Admin.is_admin_class());
        assert!(Role::SuperAdmin.is_admin_class());
        assert!(Role::Owner.is_admin_class());
        assert!(!Role::User.is_admin_class());
        assert_eq!("superadmin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!(Role::SuperAdmin.to_string(), "superadmin");
    }

    #[test]
    fn test_pending_setup_wire_format() {
        assert_eq!(PendingSetup::PasswordReset.to_string(), "password-reset");
        assert_eq!(
            "pin-setup".parse::<PendingSetup>().unwrap(),
            PendingSetup::PinSetup
        );
    }

    #[test]
    fn test_valid_session_expiry_boundary() {
        let record = SessionRecord {
            role: Some(Role::User),
            user_id: Some("C_001_M".to_string()),
            session_expiry: Some(10_000),
            ..SessionRecord::default()
        };
        assert!(record.has_valid_session(9_999));
        assert!(!record.has_valid_session(10_000));
        assert!(!record.has_valid_session(10_001));
    }

    #[test]
    fn test_profile_selection_counts_as_identity() {
        let record = SessionRecord {
            role: Some(Role::User),
            couple_id: Some("C_010".to_string()),
            session_expiry: Some(u64::MAX),
            ..SessionRecord::default()
        };
        assert!(record.has_valid_session(0));

        // An admin with only a couple id has no identity anchor.
        let record = SessionRecord {
            role: Some(Role::Admin),
            couple_id: Some("C_010".to_string()),
            session_expiry: Some(u64::MAX),
            ..SessionRecord::default()
        };
        assert!(!record.has_valid_session(0));
    }

    #[test]
    fn test_missing_expiry_is_fail_closed() {
        let record = SessionRecord {
            role: Some(Role::Admin),
            admin_uid: Some("A_1".to_string()),
            session_expiry: None,
            ..SessionRecord::default()
        };
        assert!(!record.has_valid_session(0));
    }

    #[test]
    fn test_update_round_trip_is_sparse() {
        let update = SessionUpdate {
            role: Some(Role::User),
            couple_id: Some("C_010".to_string()),
            ..SessionUpdate::default()
        };
        let pairs = update.to_pairs();
        assert_eq!(pairs.len(), 2);
        assert!(!pairs.iter().any(|(k, _)| k == keys::USER_ID));

        let mut record = SessionRecord {
            user_id: Some("C_010_F".to_string()),
            ..SessionRecord::default()
        };
        update.apply(&mut record);
        // Sparse merge never blanks fields the update did not carry.
        assert_eq!(record.user_id.as_deref(), Some("C_010_F"));
        assert_eq!(record.role, Some(Role::User));
    }
}
