//! Shared helpers for route-level consumers of the session.

pub mod auth;
