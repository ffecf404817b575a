//! Role router: which dashboard shell a role lands in, and which paths each
//! shell guards.

use std::fmt;

use crate::types::{Role, RoleSet};

/// Top-level dashboard tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shell {
    Admin,
    Mot,
    Operator,
    Unauthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

const fn nav(label: &'static str, path: &'static str) -> NavItem {
    NavItem { label, path }
}

const ADMIN_NAV: &[NavItem] = &[
    nav("Dashboard", "/admin"),
    nav("Users", "/admin/users"),
    nav("Notifications", "/admin/notifications"),
    nav("Analytics", "/admin/analytics"),
    nav("Profile", "/admin/profile"),
];

const MOT_NAV: &[NavItem] = &[
    nav("Dashboard", "/mot"),
    nav("Bus Stops", "/mot/bus-stops"),
    nav("Routes", "/mot/routes"),
    nav("Route Groups", "/mot/route-groups"),
    nav("Schedules", "/mot/schedules"),
    nav("Staff", "/mot/staff"),
    nav("Bus Tracking", "/mot/bus-tracking"),
    nav("Notifications", "/mot/notifications"),
    nav("Profile", "/mot/profile"),
];

const OPERATOR_NAV: &[NavItem] = &[
    nav("Dashboard", "/operator"),
    nav("Fleet", "/operator/fleet"),
    nav("Bus Locations", "/operator/bus-locations"),
    nav("Staff", "/operator/staff"),
    nav("Notifications", "/operator/notifications"),
    nav("Profile", "/operator/profile"),
];

/// Paths reachable without a session.
pub const PUBLIC_PATHS: &[&str] = &["/", "/login", "/unauthorized"];

impl Shell {
    pub const GUARDED: [Self; 3] = [Self::Admin, Self::Mot, Self::Operator];

    #[must_use]
    pub fn home_route(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Mot => "/mot",
            Self::Operator => "/operator",
            Self::Unauthorized => "/unauthorized",
        }
    }

    /// Path prefix owned by this shell. `Unauthorized` is public.
    #[must_use]
    pub fn guarded_prefix(self) -> Option<&'static str> {
        match self {
            Self::Unauthorized => None,
            shell => Some(shell.home_route()),
        }
    }

    #[must_use]
    pub fn navigation(self) -> &'static [NavItem] {
        match self {
            Self::Admin => ADMIN_NAV,
            Self::Mot => MOT_NAV,
            Self::Operator => OPERATOR_NAV,
            Self::Unauthorized => &[],
        }
    }

    #[must_use]
    pub fn required_roles(self) -> RoleSet {
        match self {
            Self::Admin => RoleSet::only([Role::Admin]),
            Self::Mot => RoleSet::only([Role::MotOfficial]),
            Self::Operator => RoleSet::only([Role::FleetOperator]),
            Self::Unauthorized => RoleSet::Any,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Admin => "BUSMATE LK Admin",
            Self::Mot => "Ministry of Transport",
            Self::Operator => "Fleet Operator",
            Self::Unauthorized => "Unauthorized",
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Mot => "mot",
            Self::Operator => "operator",
            Self::Unauthorized => "unauthorized",
        })
    }
}

/// Pick the dashboard shell for a role claim.
///
/// Roles without a dashboard (field staff, passenger service) and missing or
/// unrecognised roles land in [`Shell::Unauthorized`].
#[must_use]
pub fn select_shell(role: Option<Role>) -> Shell {
    match role {
        Some(Role::Admin) => Shell::Admin,
        Some(Role::MotOfficial) => Shell::Mot,
        Some(Role::FleetOperator) => Shell::Operator,
        Some(Role::Conductor | Role::Timekeeper | Role::PassengerService) | None => {
            Shell::Unauthorized
        }
    }
}

/// The guarded shell that owns `path`, matched on whole path segments.
#[must_use]
pub fn shell_for_path(path: &str) -> Option<Shell> {
    Shell::GUARDED.into_iter().find(|shell| {
        shell.guarded_prefix().is_some_and(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    })
}

/// Roles required to view `path`; `None` for public paths.
///
/// Paths outside every shell still need a session.
#[must_use]
pub fn required_roles_for_path(path: &str) -> Option<RoleSet> {
    if PUBLIC_PATHS.contains(&path) {
        return None;
    }
    Some(shell_for_path(path).map_or(RoleSet::Any, Shell::required_roles))
}
