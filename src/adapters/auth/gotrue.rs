//! GoTrue adapter - Implementation of `AuthProvider` over the GoTrue REST API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GoTrueConfig::new("https://project.supabase.co", anon_key)
//!     .with_timeout(Duration::from_secs(10));
//!
//! let provider = GoTrueAuthProvider::new(config)?;
//! ```
//!
//! Every request carries the project's anon key in the `apikey` header.
//! Session-scoped calls also send the user's access token as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::{AuthProvider, AuthSession, SignUpMetadata, SignUpRequest};

/// Configuration for the GoTrue provider.
#[derive(Debug, Clone)]
pub struct GoTrueConfig {
    /// Project URL; endpoints live under `/auth/v1`.
    pub base_url: String,
    anon_key: Secret<String>,
    pub timeout: Duration,
}

impl GoTrueConfig {
    pub fn new(base_url: impl Into<String>, anon_key: Secret<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url.trim_end_matches('/'), path)
    }
}

pub struct GoTrueAuthProvider {
    config: GoTrueConfig,
    client: Client,
}

impl GoTrueAuthProvider {
    pub fn new(config: GoTrueConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::service_unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, AuthError> {
        request
            .header("apikey", self.config.anon_key())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::service_unavailable("Auth request timed out")
                } else if e.is_connect() {
                    AuthError::service_unavailable(format!("Connection failed: {}", e))
                } else {
                    AuthError::service_unavailable(e.to_string())
                }
            })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a SignUpMetadata,
}

#[derive(Debug, Serialize)]
struct PasswordGrantBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_confirmed_at: Option<String>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

impl GoTrueUser {
    fn into_domain(self) -> Result<AuthenticatedUser, AuthError> {
        let id = UserId::new(self.id)
            .map_err(|_| AuthError::service_unavailable("Auth response missing user id"))?;
        let display_name = self
            .user_metadata
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        Ok(AuthenticatedUser::new(
            id,
            self.email.unwrap_or_default(),
            display_name,
            self.email_confirmed_at.is_some(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    user: GoTrueUser,
}

/// Signup returns a session when auto-confirm is on, a bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(SessionResponse),
    User(GoTrueUser),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn text(&self) -> String {
        self.msg
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error_description.as_deref())
            .or(self.error.as_deref())
            .unwrap_or("unknown error")
            .to_string()
    }
}

/// Which call produced a failed response; the same status means different
/// things per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    SignUp,
    SignIn,
    Session,
}

fn map_error(call: Call, status: StatusCode, body: &str) -> AuthError {
    let text = ErrorBody::parse(body).text();

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return AuthError::service_unavailable(format!("{}: {}", status, text));
    }

    match call {
        Call::SignUp if text.to_lowercase().contains("already registered") => {
            AuthError::UserAlreadyExists
        }
        Call::SignUp => AuthError::rejected(text),
        Call::SignIn if status == StatusCode::BAD_REQUEST => AuthError::InvalidCredentials,
        Call::SignIn => AuthError::rejected(text),
        Call::Session if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
            AuthError::InvalidToken
        }
        Call::Session => AuthError::rejected(text),
    }
}

async fn read_error(call: Call, response: Response) -> AuthError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    map_error(call, status, &body)
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    response
        .json()
        .await
        .map_err(|e| AuthError::service_unavailable(format!("Failed to parse response: {}", e)))
}

// ════════════════════════════════════════════════════════════════════════════════
// AuthProvider
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl AuthProvider for GoTrueAuthProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthenticatedUser, AuthError> {
        let body = SignUpBody {
            email: request.email.trim(),
            password: request.password.expose_secret(),
            data: &request.metadata,
        };
        let response = self
            .send(self.client.post(self.config.endpoint("signup")).json(&body))
            .await?;

        if !response.status().is_success() {
            return Err(read_error(Call::SignUp, response).await);
        }

        match parse_json::<SignUpResponse>(response).await? {
            SignUpResponse::Session(session) => session.user.into_domain(),
            SignUpResponse::User(user) => user.into_domain(),
        }
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError> {
        let body = PasswordGrantBody {
            email,
            password: password.expose_secret(),
        };
        let response = self
            .send(
                self.client
                    .post(self.config.endpoint("token"))
                    .query(&[("grant_type", "password")])
                    .json(&body),
            )
            .await?;

        if !response.status().is_success() {
            return Err(read_error(Call::SignIn, response).await);
        }

        let session: SessionResponse = parse_json(response).await?;
        Ok(AuthSession {
            user: session.user.into_domain()?,
            access_token: SecretString::new(session.access_token),
            expires_in: session.expires_in,
        })
    }

    async fn sign_out(&self, access_token: &SecretString) -> Result<(), AuthError> {
        let response = self
            .send(
                self.client
                    .post(self.config.endpoint("logout"))
                    .bearer_auth(access_token.expose_secret()),
            )
            .await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            // An already-expired session is signed out.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(()),
            _ => Err(read_error(Call::Session, response).await),
        }
    }

    async fn current_user(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<AuthenticatedUser>, AuthError> {
        let response = self
            .send(
                self.client
                    .get(self.config.endpoint("user"))
                    .bearer_auth(access_token.expose_secret()),
            )
            .await?;

        match response.status() {
            s if s.is_success() => {
                let user: GoTrueUser = parse_json(response).await?;
                user.into_domain().map(Some)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(read_error(Call::Session, response).await),
        }
    }
}
