//! Session-related types.
//!
//! The server-issued [`Session`] record lives in an external session backend;
//! only its shape is owned here because the guards depend on it. The
//! [`SessionPrincipal`] is what that backend hands us for an authenticated
//! request, and [`AuthUser`] is its normalized form.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use autorithm_core::{Email, UserId};

/// Session keys for authentication data.
pub mod session_keys {
    /// Key under which the session backend stores the authenticated principal.
    pub const PRINCIPAL: &str = "principal";
}

/// Error issuing a [`Session`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested lifetime would not satisfy `expires_at > created_at`.
    #[error("session lifetime must be positive")]
    NonPositiveLifetime,
}

/// A server-issued session record.
///
/// Invariants, enforced at construction and by [`Session::touch`]:
/// `expires_at > created_at` and `last_active_at >= created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Backend-assigned numeric id.
    pub id: i32,
    /// Opaque bearer token.
    pub token: String,
    /// The user this session belongs to.
    pub user_id: UserId,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
    /// Last time the session was seen on a request.
    pub last_active_at: DateTime<Utc>,
    /// Client IP address, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Client user agent, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Session {
    /// Issue a new session for a user with the given lifetime.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NonPositiveLifetime` if `lifetime` is zero or
    /// negative.
    pub fn issue(id: i32, user_id: UserId, lifetime: Duration) -> Result<Self, SessionError> {
        if lifetime <= Duration::zero() {
            return Err(SessionError::NonPositiveLifetime);
        }

        let now = Utc::now();
        Ok(Self {
            id,
            token: uuid::Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + lifetime,
            created_at: now,
            last_active_at: now,
            ip_address: None,
            user_agent: None,
        })
    }

    /// Record request activity, keeping `last_active_at >= created_at`.
    pub fn touch(&mut self) {
        self.last_active_at = Utc::now().max(self.created_at);
    }

    /// Whether the session has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The principal shape the external session backend stores for a request.
///
/// The backend contract is "at least email and name"; id and admin flag may
/// be absent and are normalized by the session materializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPrincipal {
    /// External user id, if the backend recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Principal's email address.
    pub email: Email,
    /// Principal's display name.
    pub name: String,
    /// Admin flag, if the backend recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

/// Normalized authenticated user as seen by guard functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// External user id; empty string when the backend omitted it.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Whether the user has admin privileges. Defaults to false.
    pub is_admin: bool,
}

impl From<SessionPrincipal> for AuthUser {
    fn from(principal: SessionPrincipal) -> Self {
        Self {
            id: principal.id.map_or_else(|| UserId::new(""), UserId::new),
            email: principal.email,
            name: principal.name,
            is_admin: principal.is_admin.unwrap_or(false),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_enforces_positive_lifetime() {
        assert!(matches!(
            Session::issue(1, UserId::new("1"), Duration::zero()),
            Err(SessionError::NonPositiveLifetime)
        ));
        assert!(matches!(
            Session::issue(1, UserId::new("1"), Duration::seconds(-5)),
            Err(SessionError::NonPositiveLifetime)
        ));
    }

    #[test]
    fn test_issue_invariants() {
        let session = Session::issue(1, UserId::new("1"), Duration::hours(1)).unwrap();
        assert!(session.expires_at > session.created_at);
        assert!(session.last_active_at >= session.created_at);
    }

    #[test]
    fn test_touch_keeps_invariant() {
        let mut session = Session::issue(1, UserId::new("1"), Duration::hours(1)).unwrap();
        session.touch();
        assert!(session.last_active_at >= session.created_at);
    }

    #[test]
    fn test_expiry() {
        let session = Session::issue(1, UserId::new("1"), Duration::hours(1)).unwrap();
        assert!(!session.is_expired(Utc::now()));
        assert!(session.is_expired(Utc::now() + Duration::hours(2)));
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let session = Session::issue(1, UserId::new("1"), Duration::hours(1)).unwrap();
        let json = serde_json::to_value(&session).unwrap();

        assert!(json.get("ipAddress").is_none());
        assert!(json.get("userAgent").is_none());
        assert!(json.get("lastActiveAt").is_some());
    }

    #[test]
    fn test_principal_normalization_defaults() {
        let principal = SessionPrincipal {
            id: None,
            email: Email::parse("a@x.com").unwrap(),
            name: "Ann".to_owned(),
            is_admin: None,
        };

        let user = AuthUser::from(principal);
        assert_eq!(user.id.as_str(), "");
        assert!(!user.is_admin);
    }
}
