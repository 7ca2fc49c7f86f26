//! Services for the auth crate.

pub mod auth;
