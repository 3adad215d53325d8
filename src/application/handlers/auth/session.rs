//! Session handlers: sign-in, sign-out and current-user lookup.

use std::sync::Arc;

use secrecy::SecretString;

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::{AuthProvider, AuthSession};

#[derive(Debug, Clone)]
pub struct SignInCommand {
    pub email: String,
    pub password: SecretString,
}

pub struct SignInHandler {
    auth: Arc<dyn AuthProvider>,
}

impl SignInHandler {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self { auth }
    }

    pub async fn handle(&self, cmd: SignInCommand) -> Result<AuthSession, AuthError> {
        let session = self.auth.sign_in(cmd.email.trim(), &cmd.password).await?;
        tracing::info!(user_id = %session.user.id, "User signed in");
        Ok(session)
    }
}

pub struct SignOutHandler {
    auth: Arc<dyn AuthProvider>,
}

impl SignOutHandler {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self { auth }
    }

    pub async fn handle(&self, access_token: &SecretString) -> Result<(), AuthError> {
        self.auth.sign_out(access_token).await
    }
}

/// Resolves a bearer token to the signed-in user.
pub struct CurrentUserHandler {
    auth: Arc<dyn AuthProvider>,
}

impl CurrentUserHandler {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self { auth }
    }

    pub async fn handle(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<AuthenticatedUser>, AuthError> {
        self.auth.current_user(access_token).await
    }
}
