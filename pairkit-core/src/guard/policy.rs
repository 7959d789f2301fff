//! The route-protection decision table.
//!
//! Precedence is a first-class artifact here: the guard phase is derived in
//! a fixed order (loading, setup suspension, unauthenticated, profile
//! selection, full auth) and [`decide`] consults exactly one row per
//! `(phase, group)` pair, so no two rules can fire with conflicting
//! redirects.

use crate::auth::AuthState;

use super::route::{targets, RouteGroup, RouteLocation};

/// Collapsed role partition used for routing. `admin`, `superadmin` and
/// `owner` all route identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleClass {
    /// The member experience.
    User,
    /// The admin experience.
    Admin,
}

/// Coarse authentication phase the policy keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    /// Initial load in progress; no decision may be made yet.
    Loading,
    /// An external flow (password reset, PIN setup) asked the guard to
    /// stand down. Wins over every other rule.
    SetupSuspended,
    /// No valid session.
    Unauthenticated,
    /// Household proven, profile not yet unlocked.
    ProfileSelection,
    /// Fully authenticated with the given role class.
    Authenticated(RoleClass),
}

impl GuardPhase {
    /// Derives the phase from an auth snapshot, in fixed precedence order.
    #[must_use]
    pub fn from_state(state: &AuthState) -> Self {
        if state.is_loading {
            return Self::Loading;
        }
        if state.pending_setup.is_some() {
            return Self::SetupSuspended;
        }
        if !state.is_authenticated {
            return Self::Unauthenticated;
        }
        if state.in_profile_selection() {
            return Self::ProfileSelection;
        }
        if state.is_admin_role() {
            Self::Authenticated(RoleClass::Admin)
        } else {
            Self::Authenticated(RoleClass::User)
        }
    }
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    /// The actor is allowed to be where they are.
    Stay,
    /// Replace the current location with the target.
    Redirect(&'static str),
}

/// Second-level `user` destinations reachable during profile selection.
const PROFILE_SELECTION_SCREENS: &[&str] = &["enter-pin", "manage-pin"];

/// The policy table. Pure; the first matching row decides.
#[must_use]
pub fn decide(phase: GuardPhase, location: &RouteLocation) -> GuardAction {
    match (phase, location.group) {
        // Never act while loading, and never second-guess an external setup
        // flow that navigates itself.
        (GuardPhase::Loading | GuardPhase::SetupSuspended, _) => GuardAction::Stay,

        // An unauthenticated visitor on a public screen is expected.
        (GuardPhase::Unauthenticated, RouteGroup::Auth) => GuardAction::Stay,
        (GuardPhase::Unauthenticated, RouteGroup::User | RouteGroup::Admin) => {
            GuardAction::Redirect(targets::LOGIN)
        }

        // Profile selection is contained to the PIN screens. On the auth
        // group the guard must NOT forward to home: the actor is not fully
        // authenticated yet.
        (GuardPhase::ProfileSelection, RouteGroup::User) => {
            if location
                .segment
                .as_deref()
                .is_some_and(|segment| PROFILE_SELECTION_SCREENS.contains(&segment))
            {
                GuardAction::Stay
            } else {
                GuardAction::Redirect(targets::PIN_ENTRY)
            }
        }
        (GuardPhase::ProfileSelection, RouteGroup::Auth) => GuardAction::Stay,
        (GuardPhase::ProfileSelection, RouteGroup::Admin) => {
            GuardAction::Redirect(targets::PIN_ENTRY)
        }

        // Fully authenticated actors are forwarded off entry points and
        // kept out of the other experience's group.
        (GuardPhase::Authenticated(role), RouteGroup::Auth) => {
            if location.is_entry_point() {
                GuardAction::Redirect(home_for(role))
            } else {
                GuardAction::Stay
            }
        }
        (GuardPhase::Authenticated(RoleClass::User), RouteGroup::Admin) => {
            GuardAction::Redirect(targets::USER_HOME)
        }
        (GuardPhase::Authenticated(RoleClass::Admin), RouteGroup::User) => {
            GuardAction::Redirect(targets::ADMIN_HOME)
        }
        (GuardPhase::Authenticated(_), _) => GuardAction::Stay,
    }
}

const fn home_for(role: RoleClass) -> &'static str {
    match role {
        RoleClass::User => targets::USER_HOME,
        RoleClass::Admin => targets::ADMIN_HOME,
    }
}
