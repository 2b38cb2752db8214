//! # jobboard
//!
//! Session and authorization core for the job-board client.
//!
//! This crate owns who the current user is: it persists the bearer
//! credential, talks to the remote identity service, publishes the session
//! to pages, and gates role-specific routes. Pages (job forms, dashboards,
//! profile editors) consume the published [`state::auth::AuthState`] and the
//! gate decisions; they are not part of this crate.

pub mod config;
pub mod forms;
pub mod net;
pub mod routes;
pub mod state;
pub mod util;
