//! Domain models for the auth flow.

pub mod session;
pub mod user;

pub use session::{AuthUser, Session, SessionError, SessionPrincipal, session_keys};
pub use user::{CurrentUser, User};
