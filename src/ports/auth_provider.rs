//! Auth provider port.
//!
//! Identity creation and session management live in an external auth
//! service. The signup flow and the HTTP layer reach it only through this
//! trait.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};

/// Profile-relevant fields attached to a new identity.
///
/// Server-side triggers may read these to seed the profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: SecretString,
    pub metadata: SignUpMetadata,
}

/// A signed-in session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: AuthenticatedUser,
    pub access_token: SecretString,
    pub expires_in: Option<u64>,
}

/// # Contract
///
/// - `sign_up` returns the new identity or `UserAlreadyExists`/`Rejected`.
/// - `current_user` returns `Ok(None)` for unknown or expired tokens.
/// - Network failures surface as `ServiceUnavailable`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthenticatedUser, AuthError>;

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, access_token: &SecretString) -> Result<(), AuthError>;

    async fn current_user(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<AuthenticatedUser>, AuthError>;
}
