//! Session persistence, authentication state, and route protection for Pair
//! health-tracking clients.
//!
//! The crate is organized in three layers, leaves first:
//!
//! - [`storage`]: the asynchronous key-value boundary the host platform
//!   implements (plus an in-memory store for tests and tooling).
//! - [`session`]: the typed schema of persisted session fields and the
//!   [`session::SessionStore`] that reads and writes them in batches.
//! - [`auth`] and [`guard`]: the in-memory [`AuthState`] snapshot published
//!   by the [`AuthSession`] facade, and the pure route-guard policy that is
//!   re-evaluated whenever the auth state or the current location changes.
//!
//! Sessions are local and client-trusted: expiry is a sliding window (24
//! hours, or 30 days with "remember me") checked before any other persisted
//! field is believed.

pub mod auth;
pub mod guard;
pub mod session;
pub mod storage;

pub use auth::{AuthSession, AuthState};
pub use guard::{
    decide, GuardAction, GuardPhase, Navigator, RecordingNavigator, RoleClass, RouteGroup,
    RouteGuard, RouteLocation,
};
pub use session::{
    Gender, PendingSetup, Role, SessionRecord, SessionStore, SessionUpdate,
};
pub use storage::{KeyValueStore, MemoryKeyValueStore, StorageError, StorageResult};
