//! Autorithm authentication library.
//!
//! Implements the account and session flow for the Autorithm storefront:
//!
//! - [`store`] - file-backed key-value store holding user records and reset
//!   tokens (the browser localStorage analog)
//! - [`services::auth`] - the auth session context: login, registration,
//!   logout, password reset
//! - [`middleware`] - server-side guards over tower-sessions for protected
//!   routes
//!
//! Routing, templates, and the rest of the storefront live elsewhere; this
//! crate only exposes the pieces they call into.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
