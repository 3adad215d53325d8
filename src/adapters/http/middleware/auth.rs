//! Authentication middleware and extractors for axum.
//!
//! - `auth_middleware` - resolves a Bearer token through the `AuthProvider`
//!   port and injects the user and token into request extensions
//! - `RequireAuth` - extractor that requires a resolved user
//! - `BearerToken` - extractor for the raw access token (sign-out)
//!
//! ```text
//! Request → auth_middleware → AuthenticatedUser + BearerToken in extensions
//!                                      ↓
//!                              Handler → RequireAuth reads from extensions
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::SecretString;

use crate::adapters::http::error::ApiError;
use crate::domain::foundation::AuthenticatedUser;
use crate::ports::AuthProvider;

pub type AuthState = Arc<dyn AuthProvider>;

/// Resolves `Authorization: Bearer <token>`.
///
/// Requests without a token pass through untouched so public routes keep
/// working. A token the provider does not recognize is rejected with 401.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .map(|t| SecretString::new(t.to_string()));

    let Some(token) = token else {
        return next.run(request).await;
    };

    match auth.current_user(&token).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            request.extensions_mut().insert(BearerToken(token));
            next.run(request).await
        }
        Ok(None) => ApiError::from(crate::domain::foundation::AuthError::InvalidToken)
            .into_response(),
        Err(e) => {
            tracing::warn!("Token lookup failed: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor that requires an authenticated user.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(ApiError::unauthenticated)
    }
}

/// The access token that authenticated this request.
#[derive(Debug, Clone)]
pub struct BearerToken(pub SecretString);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or_else(ApiError::unauthenticated)
    }
}
