//! Shared route-guard helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected route applies the same decision: anonymous users go to
//! the login page, users of the wrong role go home, everyone else sees the
//! content. The decision is a pure function of an [`AuthState`] snapshot.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use tokio::task::JoinHandle;

use crate::net::types::Role;
use crate::state::auth::{AuthState, SessionManager};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Outcome of gating one navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Render,
    RedirectToLogin,
    RedirectToHome,
}

impl GateDecision {
    /// Where to navigate, or `None` to render the protected content.
    #[must_use]
    pub fn redirect_path(self) -> Option<&'static str> {
        match self {
            Self::Render => None,
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToHome => Some(HOME_PATH),
        }
    }
}

/// Gate a protected route.
///
/// Returns `None` while the session is still rehydrating; callers withhold
/// rendering until a decision is available.
#[must_use]
pub fn evaluate(state: &AuthState, required: Option<&Role>) -> Option<GateDecision> {
    if state.loading {
        return None;
    }
    let Some(user) = &state.user else {
        return Some(GateDecision::RedirectToLogin);
    };
    match required {
        Some(role) if user.role != *role => Some(GateDecision::RedirectToHome),
        _ => Some(GateDecision::Render),
    }
}

/// Re-evaluate the gate on every session change and call `navigate` whenever
/// the route must be left.
///
/// The task ends when the session is dropped.
pub fn spawn_route_guard<F>(session: &SessionManager, required: Option<Role>, navigate: F) -> JoinHandle<()>
where
    F: Fn(&'static str) + Send + 'static,
{
    let mut rx = session.subscribe();
    tokio::spawn(async move {
        loop {
            let decision = evaluate(&rx.borrow_and_update(), required.as_ref());
            if let Some(path) = decision.and_then(GateDecision::redirect_path) {
                navigate(path);
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}
