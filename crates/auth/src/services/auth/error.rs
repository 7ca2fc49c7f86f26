//! Authentication error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during auth context operations.
///
/// None of these escape the provider: every operation catches them and
/// surfaces [`AuthError::user_message`] in its outcome value.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No account matches the given email.
    #[error("no account for email")]
    NoSuchAccount,

    /// The account exists but the password does not match.
    #[error("password mismatch")]
    WrongPassword,

    /// Registration attempted with an email that is already taken.
    #[error("email already registered")]
    EmailExists,

    /// Reset link is missing its email parameter.
    #[error("reset link missing email")]
    InvalidLink,

    /// No stored reset token matches, or the token was already consumed.
    #[error("reset token missing or mismatched")]
    InvalidOrExpiredLink,

    /// The user record vanished between token validation and update.
    #[error("user record not found")]
    UserNotFound,

    /// Underlying store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// The short human-readable string surfaced to callers.
    ///
    /// Store failures are deliberately vague; their detail goes to the log,
    /// never to the caller.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NoSuchAccount => "No account found with this email",
            Self::WrongPassword => "Incorrect password",
            Self::EmailExists => "An account with this email already exists",
            Self::InvalidLink => "Invalid reset link",
            Self::InvalidOrExpiredLink => "Invalid or expired reset link",
            Self::UserNotFound => "User not found",
            Self::Store(_) => "Something went wrong, please try again",
        }
    }
}
