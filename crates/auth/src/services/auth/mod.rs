//! Auth session context.
//!
//! [`AuthProvider`] holds the current authenticated user for one client
//! context (one browser tab's worth of state) and exposes the mutating
//! operations the UI calls: login, register, logout, forgot-password,
//! reset-password.
//!
//! The provider is an explicit, constructor-injected object rather than
//! process-global state. Each instance owns a handle to the shared
//! [`LocalStore`]; instances do not coordinate with each other, so concurrent
//! writers follow the store's last-writer-wins rule.

mod error;

pub use error::AuthError;

use std::time::Duration;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;

use autorithm_core::{Email, UserId};

use crate::config::AuthConfig;
use crate::models::{CurrentUser, User};
use crate::store::users::UserStore;
use crate::store::{LocalStore, StoreError, keys};

/// Length of generated reset tokens.
const RESET_TOKEN_LENGTH: usize = 12;

/// Result shape surfaced to UI callers by every mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthOutcome {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Short human-readable failure message, when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthOutcome {
    /// A successful outcome.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed outcome with a user-facing message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }
}

/// Navigation side-channel.
///
/// Logout redirects the client to the application root; the web layer
/// supplies the real implementation, tests record the pushes.
pub trait Navigator: Send + Sync {
    /// Navigate the client to `path`.
    fn push(&self, path: &str);
}

/// Navigator that only logs the requested navigation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn push(&self, path: &str) {
        tracing::info!(path, "navigation requested");
    }
}

/// Ambient page location.
///
/// Reset-password takes its email from the current page's query string rather
/// than from an argument; this capability makes that ambient state explicit.
pub trait PageLocation: Send + Sync {
    /// The current page's raw query string, without the leading `?`.
    fn query(&self) -> Option<String>;
}

/// A fixed page location, for contexts where the query is known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticLocation {
    query: Option<String>,
}

impl StaticLocation {
    /// A location with the given query string.
    #[must_use]
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
        }
    }

    /// A location with no query string at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self { query: None }
    }
}

impl PageLocation for StaticLocation {
    fn query(&self) -> Option<String> {
        self.query.clone()
    }
}

/// The auth session context for one client.
///
/// State machine: construction leaves the provider loading; [`init`] moves it
/// to unauthenticated or authenticated and clears the loading flag. Operations
/// run to completion sequentially per instance (`&mut self`); the only
/// awaiting inside an operation is the simulated network latency.
///
/// [`init`]: AuthProvider::init
pub struct AuthProvider {
    store: LocalStore,
    latency: Duration,
    base_url: String,
    navigator: Box<dyn Navigator>,
    location: Box<dyn PageLocation>,
    user: Option<CurrentUser>,
    loading: bool,
}

impl AuthProvider {
    /// Create a provider over the shared store.
    ///
    /// The provider starts in the loading state; call [`AuthProvider::init`]
    /// to restore any persisted session.
    #[must_use]
    pub fn new(
        store: LocalStore,
        config: &AuthConfig,
        navigator: Box<dyn Navigator>,
        location: Box<dyn PageLocation>,
    ) -> Self {
        Self {
            store,
            latency: config.simulated_latency,
            base_url: config.base_url.clone(),
            navigator,
            location,
            user: None,
            loading: true,
        }
    }

    /// Restore a previously persisted session, if any.
    ///
    /// A malformed persisted value is discarded and deleted; it is treated as
    /// "no session", never surfaced as a failure.
    pub fn init(&mut self) {
        match self.store.get(keys::USER) {
            Ok(Some(raw)) => match serde_json::from_str::<CurrentUser>(&raw) {
                Ok(user) => self.user = Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding malformed persisted session");
                    if let Err(e) = self.store.remove(keys::USER) {
                        tracing::warn!(error = %e, "failed to clear persisted session");
                    }
                }
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "failed to read persisted session"),
        }
        self.loading = false;
    }

    /// The currently authenticated user, if any.
    #[must_use]
    pub const fn current_user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Whether the provider is still restoring persisted state.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Log in with email and password.
    pub async fn login(&mut self, email: &str, password: &str) -> AuthOutcome {
        self.simulate_latency().await;
        into_outcome(self.try_login(email, password))
    }

    /// Register a new account and log it in immediately.
    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> AuthOutcome {
        self.simulate_latency().await;
        into_outcome(self.try_register(email, password, name))
    }

    /// Clear the session and navigate to the application root.
    pub fn logout(&mut self) {
        self.user = None;
        if let Err(e) = self.store.remove(keys::USER) {
            tracing::warn!(error = %e, "failed to clear persisted session on logout");
        }
        self.navigator.push("/");
    }

    /// Request a password reset for an email.
    ///
    /// Stores a fresh single-use token (overwriting any prior one) and emits
    /// the reset link to the operator log in place of an email send.
    pub async fn forgot_password(&mut self, email: &str) -> AuthOutcome {
        self.simulate_latency().await;
        into_outcome(self.try_forgot_password(email))
    }

    /// Consume a reset token and set a new password.
    ///
    /// The target email comes from the current page's query string, not from
    /// an argument.
    pub async fn reset_password(&mut self, token: &str, password: &str) -> AuthOutcome {
        self.simulate_latency().await;
        into_outcome(self.try_reset_password(token, password))
    }

    fn try_login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let users = UserStore::new(&self.store);
        let found = users
            .get_by_email(email)?
            .ok_or(AuthError::NoSuchAccount)?;

        if found.password != password {
            return Err(AuthError::WrongPassword);
        }

        self.persist_session(CurrentUser::from(&found))
    }

    fn try_register(&mut self, email: &str, password: &str, name: &str) -> Result<(), AuthError> {
        let users = UserStore::new(&self.store);
        let user = users
            .create(User {
                id: UserId::generate(),
                // The email is stored exactly as entered; uniqueness is the
                // only constraint.
                email: Email::new_unchecked(email),
                password: password.to_owned(),
                name: name.to_owned(),
                purchased_products: Vec::new(),
            })
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::EmailExists,
                other => AuthError::Store(other),
            })?;

        // Auto-login: the freshly created record is trusted as-is.
        self.persist_session(CurrentUser::from(&user))
    }

    fn try_forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let users = UserStore::new(&self.store);
        users
            .get_by_email(email)?
            .ok_or(AuthError::NoSuchAccount)?;

        let token = generate_reset_token();
        self.store.set(&keys::reset_token(email), &token)?;

        // Stand-in for the email send.
        tracing::info!(
            "Password reset link: {}/reset-password?token={token}&email={email}",
            self.base_url
        );

        Ok(())
    }

    fn try_reset_password(&self, token: &str, password: &str) -> Result<(), AuthError> {
        let email = self
            .location
            .query()
            .and_then(|q| email_param(&q))
            .ok_or(AuthError::InvalidLink)?;

        let token_key = keys::reset_token(&email);
        match self.store.get(&token_key)? {
            Some(stored) if stored == token => {}
            _ => return Err(AuthError::InvalidOrExpiredLink),
        }

        let users = UserStore::new(&self.store);
        let email = Email::new_unchecked(email);
        users.update_password(&email, password).map_err(|e| match e {
            StoreError::NotFound => AuthError::UserNotFound,
            other => AuthError::Store(other),
        })?;

        // Token is single-use: consume it only after the update succeeds.
        self.store.remove(&token_key)?;

        Ok(())
    }

    fn persist_session(&mut self, user: CurrentUser) -> Result<(), AuthError> {
        let raw = serde_json::to_string(&user)
            .map_err(|e| StoreError::DataCorruption(format!("failed to encode session: {e}")))?;
        self.store.set(keys::USER, &raw)?;
        self.user = Some(user);
        Ok(())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

/// Convert an operation result into the outcome value surfaced to callers.
///
/// Store failures keep their detail in the log only.
fn into_outcome(result: Result<(), AuthError>) -> AuthOutcome {
    match result {
        Ok(()) => AuthOutcome::ok(),
        Err(err) => {
            if matches!(err, AuthError::Store(_)) {
                tracing::error!(error = %err, "auth operation failed");
            }
            AuthOutcome::failure(err.user_message())
        }
    }
}

/// Generate a pseudo-random single-use reset token.
fn generate_reset_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Extract the `email` parameter from a raw query string.
fn email_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "email")
        .map(|(_, value)| value.into_owned())
}
