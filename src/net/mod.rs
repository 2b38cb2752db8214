//! Networking modules for the identity service.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` makes the HTTP calls and `types` defines the wire schema, including
//! the client-to-server registration mapping.

pub mod api;
pub mod types;
