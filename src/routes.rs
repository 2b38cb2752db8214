//! Application route table and role landing pages.
//!
//! Paths not listed in [`PROTECTED_ROUTES`] are public (home, login,
//! register, job search and job detail).

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::net::types::Role;
use crate::state::auth::AuthState;
use crate::util::auth::{GateDecision, HOME_PATH, evaluate};

pub const JOB_SEEKER_DASHBOARD: &str = "/job-seeker/dashboard";
pub const EMPLOYER_DASHBOARD: &str = "/employer/dashboard";

/// A route that needs a signed-in user, optionally of one role.
#[derive(Debug, PartialEq, Eq)]
pub struct ProtectedRoute {
    /// Path pattern; `:name` segments match any single non-empty segment.
    pub pattern: &'static str,
    pub role: Option<Role>,
}

pub const PROTECTED_ROUTES: &[ProtectedRoute] = &[
    ProtectedRoute { pattern: JOB_SEEKER_DASHBOARD, role: Some(Role::JobSeeker) },
    ProtectedRoute { pattern: "/job-seeker/profile", role: Some(Role::JobSeeker) },
    ProtectedRoute { pattern: "/job-seeker/applications", role: Some(Role::JobSeeker) },
    ProtectedRoute { pattern: EMPLOYER_DASHBOARD, role: Some(Role::Employer) },
    ProtectedRoute { pattern: "/employer/profile", role: Some(Role::Employer) },
    ProtectedRoute { pattern: "/employer/jobs/create", role: Some(Role::Employer) },
    ProtectedRoute { pattern: "/employer/jobs/:id/edit", role: Some(Role::Employer) },
    ProtectedRoute { pattern: "/employer/jobs/:id/applications", role: Some(Role::Employer) },
    ProtectedRoute { pattern: "/my-jobs", role: Some(Role::Employer) },
    ProtectedRoute { pattern: "/create-job", role: Some(Role::Employer) },
    ProtectedRoute { pattern: "/edit-job/:id", role: Some(Role::Employer) },
    ProtectedRoute { pattern: "/job-applications/:id", role: Some(Role::Employer) },
];

/// Protected route matching `path`, ignoring any query string or fragment.
#[must_use]
pub fn find_protected(path: &str) -> Option<&'static ProtectedRoute> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    PROTECTED_ROUTES
        .iter()
        .find(|route| pattern_matches(route.pattern, path))
}

/// Gate a navigation to `path`. Public paths always render once the session
/// has loaded.
#[must_use]
pub fn gate_path(state: &AuthState, path: &str) -> Option<GateDecision> {
    match find_protected(path) {
        Some(route) => evaluate(state, route.role.as_ref()),
        None if state.loading => None,
        None => Some(GateDecision::Render),
    }
}

/// Where a user of `role` lands after signing in or registering.
#[must_use]
pub fn landing_path(role: &Role) -> &'static str {
    match role {
        Role::JobSeeker => JOB_SEEKER_DASHBOARD,
        Role::Employer => EMPLOYER_DASHBOARD,
        Role::Other(_) => HOME_PATH,
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = segments(pattern);
    let mut path_segments = segments(path);
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(expected), Some(actual)) => {
                if !expected.starts_with(':') && expected != actual {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
