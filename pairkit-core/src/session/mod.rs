//! Typed schema and store for the persisted session record.

pub mod keys;
pub mod record;
pub mod store;

pub use record::{Gender, PendingSetup, Role, SessionRecord, SessionUpdate};
pub use store::{
    current_epoch_ms, expiry_for, SessionStore, REMEMBERED_SESSION_TTL_MS, SESSION_TTL_MS,
};
