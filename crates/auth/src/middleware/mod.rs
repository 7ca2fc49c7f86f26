//! Middleware and request-time guards.

pub mod auth;

pub use auth::{
    GuardRejection, OptionalAuth, RequireAdmin, RequireAuth, clear_principal, get_session,
    require_admin, require_auth, set_principal,
};
