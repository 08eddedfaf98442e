//! Dashboard route guard.
//!
//! Decides, from the caller's session state, whether a protected route
//! renders, waits, or redirects. The decision is deterministic and holds
//! no state of its own.

use serde::Serialize;
use whisper_db::entities::UserRole;

use super::identity::Session;

/// Sign-in entry point.
pub const LOGIN_ROUTE: &str = "/login";
/// Default landing route for callers without access.
pub const HOME_ROUTE: &str = "/";
/// Start of the reporting flow.
pub const COMPANY_CODE_ROUTE: &str = "/company-code";

/// Session resolution as seen by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Unauthenticated,
    Authenticated(UserRole),
}

impl From<Option<&Session>> for SessionState {
    fn from(session: Option<&Session>) -> Self {
        session.map_or(Self::Unauthenticated, |s| Self::Authenticated(s.role()))
    }
}

/// A route and the roles that may open it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectedRoute {
    pub path: &'static str,
    /// `None` admits any signed-in role.
    pub allowed_roles: Option<&'static [UserRole]>,
}

pub const ADMIN_ROUTE: ProtectedRoute = ProtectedRoute {
    path: "/admin",
    allowed_roles: Some(&[UserRole::Admin]),
};

pub const MODERATOR_ROUTE: ProtectedRoute = ProtectedRoute {
    path: "/moderator",
    allowed_roles: Some(&[UserRole::Moderator]),
};

pub const INVESTIGATOR_ROUTE: ProtectedRoute = ProtectedRoute {
    path: "/investigator",
    allowed_roles: Some(&[UserRole::Investigator]),
};

/// Every guarded dashboard.
pub const DASHBOARD_ROUTES: [ProtectedRoute; 3] = [ADMIN_ROUTE, MODERATOR_ROUTE, INVESTIGATOR_ROUTE];

/// The dashboard guarding `path`, if any.
///
/// Matching ignores case, trailing slashes, query and fragment, and covers
/// nested pages below a dashboard.
#[must_use]
pub fn protected_route_for(path: &str) -> Option<ProtectedRoute> {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let path = path.trim_end_matches('/');

    DASHBOARD_ROUTES.iter().copied().find(|route| {
        path == route.path
            || path
                .strip_prefix(route.path)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// What the caller should do with a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session still resolving; show a neutral placeholder and decide later.
    Wait,
    /// Navigate away. `replace` drops the protected route from history.
    Redirect { to: &'static str, replace: bool },
    Render,
}

/// Decide whether `route` may render for `state`.
#[must_use]
pub fn guard(state: SessionState, route: &ProtectedRoute) -> GuardDecision {
    match state {
        SessionState::Loading => GuardDecision::Wait,
        SessionState::Unauthenticated => GuardDecision::Redirect {
            to: LOGIN_ROUTE,
            replace: true,
        },
        SessionState::Authenticated(role) => match route.allowed_roles {
            Some(allowed) if !allowed.contains(&role) => GuardDecision::Redirect {
                to: HOME_ROUTE,
                replace: true,
            },
            _ => GuardDecision::Render,
        },
    }
}

/// Where a role lands after signing in.
#[must_use]
pub const fn landing_route(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => ADMIN_ROUTE.path,
        UserRole::Moderator => MODERATOR_ROUTE.path,
        UserRole::Investigator => INVESTIGATOR_ROUTE.path,
        UserRole::User => COMPANY_CODE_ROUTE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_waits() {
        for route in &DASHBOARD_ROUTES {
            assert_eq!(guard(SessionState::Loading, route), GuardDecision::Wait);
        }
    }

    #[test]
    fn test_unauthenticated_goes_to_login() {
        assert_eq!(
            guard(SessionState::Unauthenticated, &ADMIN_ROUTE),
            GuardDecision::Redirect {
                to: "/login",
                replace: true
            }
        );
    }

    #[test]
    fn test_moderator_cannot_open_admin() {
        assert_eq!(
            guard(SessionState::Authenticated(UserRole::Moderator), &ADMIN_ROUTE),
            GuardDecision::Redirect {
                to: "/",
                replace: true
            }
        );
    }

    #[test]
    fn test_each_role_opens_only_its_dashboard() {
        for role in [UserRole::Admin, UserRole::Moderator, UserRole::Investigator] {
            let rendered: Vec<_> = DASHBOARD_ROUTES
                .iter()
                .filter(|r| guard(SessionState::Authenticated(role), r) == GuardDecision::Render)
                .map(|r| r.path)
                .collect();
            assert_eq!(rendered, vec![landing_route(role)]);
        }
    }

    #[test]
    fn test_plain_user_is_turned_away() {
        for route in &DASHBOARD_ROUTES {
            assert!(matches!(
                guard(SessionState::Authenticated(UserRole::User), route),
                GuardDecision::Redirect { to: "/", .. }
            ));
        }
    }

    #[test]
    fn test_open_route_admits_any_role() {
        let route = ProtectedRoute {
            path: "/account",
            allowed_roles: None,
        };
        assert_eq!(
            guard(SessionState::Authenticated(UserRole::User), &route),
            GuardDecision::Render
        );
    }

    #[test]
    fn test_route_lookup_normalizes_path() {
        for path in ["/admin", "/admin/", "/Admin", "/ADMIN//", "/admin?tab=2", "/admin/reports/7"] {
            assert_eq!(protected_route_for(path), Some(ADMIN_ROUTE), "{path}");
        }
        assert_eq!(protected_route_for("/moderator#queue"), Some(MODERATOR_ROUTE));
        assert_eq!(protected_route_for("/administrator"), None);
        assert_eq!(protected_route_for("/"), None);
        assert_eq!(protected_route_for("/status"), None);
    }

    #[test]
    fn test_landing_routes() {
        assert_eq!(landing_route(UserRole::User), "/company-code");
        assert_eq!(landing_route(UserRole::Admin), "/admin");
    }

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_value(GuardDecision::Redirect {
            to: "/login",
            replace: true,
        })
        .unwrap_or_default();
        assert_eq!(json["decision"], "redirect");
        assert_eq!(json["to"], "/login");
    }
}
