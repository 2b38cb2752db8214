//! Client-side session state.
//!
//! DESIGN
//! ======
//! `token` is the durable credential slot; `auth` is the in-memory session
//! built on top of it. Only `auth` writes to the token store during normal
//! operation.

pub mod auth;
pub mod token;
