//! Authentication guards and extractors.
//!
//! Server-side checks gating protected route handlers. The session itself is
//! owned by an external backend (tower-sessions); this module only resolves
//! the stored principal into an [`AuthUser`] and short-circuits the request
//! when that fails.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{AuthUser, SessionPrincipal, session_keys};

/// Resolve the current session into a normalized [`AuthUser`].
///
/// Missing id normalizes to the empty string, missing admin flag to false.
/// Any failure along the way - no principal, decode error, backend error -
/// yields `None`; this never propagates a failure.
pub async fn get_session(session: &Session) -> Option<AuthUser> {
    let principal: SessionPrincipal = session
        .get(session_keys::PRINCIPAL)
        .await
        .ok()
        .flatten()?;

    Some(AuthUser::from(principal))
}

/// Rejection produced by the guard functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    /// No authenticated session (401).
    Unauthorized,
    /// Authenticated but not an admin (403).
    Forbidden,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Unauthorized" })),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "message": "Forbidden: Admin access required" })),
            )
                .into_response(),
        }
    }
}

/// Require an authenticated session.
///
/// # Errors
///
/// Returns `GuardRejection::Unauthorized` when no session resolves.
pub async fn require_auth(session: &Session) -> Result<AuthUser, GuardRejection> {
    get_session(session)
        .await
        .ok_or(GuardRejection::Unauthorized)
}

/// Require an authenticated session with the admin flag set.
///
/// # Errors
///
/// Returns `GuardRejection::Unauthorized` when no session resolves, and
/// `GuardRejection::Forbidden` when the resolved user is not an admin.
pub async fn require_admin(session: &Session) -> Result<AuthUser, GuardRejection> {
    let user = require_auth(session).await?;

    if !user.is_admin {
        return Err(GuardRejection::Forbidden);
    }

    Ok(user)
}

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The session is put into extensions by SessionManagerLayer.
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(GuardRejection::Unauthorized)?;

        require_auth(session).await.map(Self)
    }
}

/// Extractor that requires an authenticated admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn admin_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(GuardRejection::Unauthorized)?;

        require_admin(session).await.map(Self)
    }
}

/// Extractor that optionally resolves the current user.
///
/// Unlike [`RequireAuth`], this never rejects the request.
pub struct OptionalAuth(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => get_session(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to store the authenticated principal in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_principal(
    session: &Session,
    principal: &SessionPrincipal,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::PRINCIPAL, principal).await
}

/// Helper to clear the principal from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_principal(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<SessionPrincipal>(session_keys::PRINCIPAL)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use autorithm_core::Email;
    use tower_sessions::MemoryStore;

    use super::*;

    fn memory_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn principal(is_admin: Option<bool>) -> SessionPrincipal {
        SessionPrincipal {
            id: Some("1700000000000".to_owned()),
            email: Email::parse("a@x.com").unwrap(),
            name: "Ann".to_owned(),
            is_admin,
        }
    }

    #[tokio::test]
    async fn test_get_session_empty() {
        let session = memory_session();
        assert!(get_session(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_get_session_normalizes() {
        let session = memory_session();
        set_principal(&session, &principal(None)).await.unwrap();

        let user = get_session(&session).await.unwrap();
        assert_eq!(user.email.as_str(), "a@x.com");
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn test_get_session_swallows_malformed_principal() {
        let session = memory_session();
        // Store something that does not decode as a principal.
        session
            .insert(session_keys::PRINCIPAL, &42_i32)
            .await
            .unwrap();

        assert!(get_session(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_require_auth_unauthorized() {
        let session = memory_session();
        assert_eq!(
            require_auth(&session).await.unwrap_err(),
            GuardRejection::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_require_auth_resolves_user() {
        let session = memory_session();
        set_principal(&session, &principal(Some(false))).await.unwrap();

        let user = require_auth(&session).await.unwrap();
        assert_eq!(user.name, "Ann");
    }

    #[tokio::test]
    async fn test_require_admin_forbidden_for_plain_user() {
        let session = memory_session();
        set_principal(&session, &principal(Some(false))).await.unwrap();

        assert_eq!(
            require_admin(&session).await.unwrap_err(),
            GuardRejection::Forbidden
        );
    }

    #[tokio::test]
    async fn test_require_admin_allows_admin() {
        let session = memory_session();
        set_principal(&session, &principal(Some(true))).await.unwrap();

        let user = require_admin(&session).await.unwrap();
        assert!(user.is_admin);
    }

    #[tokio::test]
    async fn test_clear_principal_logs_out() {
        let session = memory_session();
        set_principal(&session, &principal(Some(true))).await.unwrap();
        clear_principal(&session).await.unwrap();

        assert_eq!(
            require_auth(&session).await.unwrap_err(),
            GuardRejection::Unauthorized
        );
    }

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(
            GuardRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GuardRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
