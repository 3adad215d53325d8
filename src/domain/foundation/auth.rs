//! Authentication types for the domain layer.
//!
//! These types represent a user identity issued by the auth subsystem.
//! They have **no external dependencies** - any GoTrue-style provider can
//! populate them via the `AuthProvider` port.

use super::UserId;
use thiserror::Error;

/// Identity returned by the auth subsystem after signup, sign-in or a
/// session lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the auth provider.
    pub id: UserId,

    /// User's email address.
    pub email: String,

    /// Display name from signup metadata, if any.
    pub display_name: Option<String>,

    /// Whether the user's email has been verified by the auth provider.
    pub email_verified: bool,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        display_name: Option<String>,
        email_verified: bool,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            display_name,
            email_verified,
        }
    }

    /// Returns the user's display name, or email as fallback.
    pub fn display_name_or_email(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Authentication errors.
///
/// Domain-centric: they describe what went wrong from the application's
/// perspective, not the provider's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email/password pair was rejected.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Signup attempted for an email that already has an identity.
    #[error("A user with this email already exists")]
    UserAlreadyExists,

    /// The token is missing, malformed, or expired.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The provider accepted the request but refused it (weak password,
    /// disabled signups, ...). Carries the provider's message.
    #[error("Auth request rejected: {0}")]
    Rejected(String),

    /// The authentication service is unavailable (network, config, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Creates a rejection error with the provider's message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
