//! Mock auth provider for tests and local development.
//!
//! Keeps identities, passwords and session tokens in memory.
//!
//! # Example
//!
//! ```ignore
//! let auth = MockAuthProvider::new();
//! let user = auth.register("sam@example.com", "hunter22", "Sam");
//! auth.add_session("token-1", user);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::{AuthProvider, AuthSession, SignUpMetadata, SignUpRequest};

#[derive(Debug, Clone)]
struct Account {
    user: AuthenticatedUser,
    password: String,
}

#[derive(Debug, Default)]
struct MockState {
    /// Keyed by lower-cased email.
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, AuthenticatedUser>,
    force_error: Option<AuthError>,
    signups: usize,
    last_metadata: Option<SignUpMetadata>,
}

#[derive(Debug, Default)]
pub struct MockAuthProvider {
    state: Mutex<MockState>,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates an account directly, bypassing `sign_up` bookkeeping.
    pub fn register(&self, email: &str, password: &str, name: &str) -> AuthenticatedUser {
        let user = AuthenticatedUser::new(
            new_user_id(),
            email,
            Some(name.to_string()).filter(|n| !n.is_empty()),
            true,
        );
        self.state().accounts.insert(
            email.to_lowercase(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    /// Makes `token` resolve to `user`.
    pub fn add_session(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.state().sessions.insert(token.into(), user);
    }

    /// Marks the account's email as verified, including live sessions.
    pub fn confirm_email(&self, email: &str) {
        let mut state = self.state();
        let Some(account) = state.accounts.get_mut(&email.trim().to_lowercase()) else {
            return;
        };
        account.user.email_verified = true;
        let user_id = account.user.id.clone();
        for user in state.sessions.values_mut() {
            if user.id == user_id {
                user.email_verified = true;
            }
        }
    }

    /// Forces every call to fail with `error`; `None` restores normal behavior.
    pub fn set_error(&self, error: Option<AuthError>) {
        self.state().force_error = error;
    }

    /// Number of successful `sign_up` calls.
    pub fn signup_count(&self) -> usize {
        self.state().signups
    }

    /// Metadata passed to the most recent `sign_up`.
    pub fn last_metadata(&self) -> Option<SignUpMetadata> {
        self.state().last_metadata.clone()
    }

    fn check_forced_error(&self) -> Result<(), AuthError> {
        match self.state().force_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn new_user_id() -> UserId {
    UserId::from_uuid(Uuid::new_v4())
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthenticatedUser, AuthError> {
        self.check_forced_error()?;
        let key = request.email.trim().to_lowercase();
        let mut state = self.state();
        if state.accounts.contains_key(&key) {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = AuthenticatedUser::new(
            new_user_id(),
            request.email.trim(),
            Some(request.metadata.name.clone()).filter(|n| !n.trim().is_empty()),
            false,
        );
        state.accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: request.password.expose_secret().clone(),
            },
        );
        state.signups += 1;
        state.last_metadata = Some(request.metadata);
        Ok(user)
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError> {
        self.check_forced_error()?;
        let mut state = self.state();
        let account = state
            .accounts
            .get(&email.to_lowercase())
            .filter(|a| a.password == *password.expose_secret())
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        let token = format!("mock-token-{}", Uuid::new_v4());
        state.sessions.insert(token.clone(), account.user.clone());
        Ok(AuthSession {
            user: account.user,
            access_token: SecretString::new(token),
            expires_in: Some(3600),
        })
    }

    async fn sign_out(&self, access_token: &SecretString) -> Result<(), AuthError> {
        self.check_forced_error()?;
        self.state().sessions.remove(access_token.expose_secret());
        Ok(())
    }

    async fn current_user(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<AuthenticatedUser>, AuthError> {
        self.check_forced_error()?;
        Ok(self
            .state()
            .sessions
            .get(access_token.expose_secret())
            .cloned())
    }
}
