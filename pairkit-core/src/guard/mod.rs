//! Route-protection policy and its reactive wrapper.
//!
//! The policy itself is a pure function over `(guard phase, location)`; the
//! [`RouteGuard`] re-evaluates it whenever the auth state or the current
//! location changes and issues replace-navigations through the host's
//! [`Navigator`].

pub mod effect;
pub mod policy;
pub mod route;

pub use effect::{Navigator, RecordingNavigator, RouteGuard};
pub use policy::{decide, GuardAction, GuardPhase, RoleClass};
pub use route::{targets, RouteGroup, RouteLocation};
