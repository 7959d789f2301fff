//! Navigation locations as the guard sees them.

/// Navigation targets the guard may redirect to.
pub mod targets {
    /// The login screen. Self-navigating; never an entry point.
    pub const LOGIN: &str = "/auth/login";
    /// Home screen of the user experience.
    pub const USER_HOME: &str = "/user/home";
    /// Home screen of the admin experience.
    pub const ADMIN_HOME: &str = "/admin/home";
    /// Profile PIN-entry screen, the landing spot of profile selection.
    pub const PIN_ENTRY: &str = "/user/enter-pin";
    /// PIN management screen, also reachable during profile selection.
    pub const PIN_MANAGE: &str = "/user/manage-pin";
}

/// Top-level navigation partition, inferred from the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    /// Public and entry screens: login, onboarding, password reset, the
    /// intake questionnaire. Anything that is not `user` or `admin`.
    Auth,
    /// The member experience.
    User,
    /// The admin experience.
    Admin,
}

/// A parsed navigation location: the route group plus the segment below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLocation {
    /// The top-level partition.
    pub group: RouteGroup,
    /// The second-level destination, if any.
    pub segment: Option<String>,
}

impl RouteLocation {
    /// Parses a path such as `/user/home` or `/auth/login`.
    ///
    /// The first segment selects the group; unrecognized first segments are
    /// public screens and classify as the `auth` group with the segment
    /// itself as the destination (the intake questionnaire lives at the top
    /// level, for instance).
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        match segments.next() {
            Some("user") => Self {
                group: RouteGroup::User,
                segment: segments.next().map(str::to_string),
            },
            Some("admin") => Self {
                group: RouteGroup::Admin,
                segment: segments.next().map(str::to_string),
            },
            Some("auth") => Self {
                group: RouteGroup::Auth,
                segment: segments.next().map(str::to_string),
            },
            Some(public) => Self {
                group: RouteGroup::Auth,
                segment: Some(public.to_string()),
            },
            None => Self {
                group: RouteGroup::Auth,
                segment: None,
            },
        }
    }

    /// Whether this is an entry point: the landing/index/get-started
    /// screens a fully authenticated actor should be forwarded away from.
    /// Login is not one; it self-navigates after a successful submit.
    #[must_use]
    pub fn is_entry_point(&self) -> bool {
        self.group == RouteGroup::Auth
            && matches!(
                self.segment.as_deref(),
                None | Some("index" | "landing" | "get-started")
            )
    }
}
