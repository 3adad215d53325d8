//! HTTP handlers for account endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use secrecy::ExposeSecret;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{BearerToken, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::SignInCommand;
use crate::domain::foundation::AuthError;

use super::dto::{
    ProfileResponse, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse, UserResponse,
};

/// POST /api/auth/signup - Create an identity, profile and reward ledger
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.sign_up_handler().handle(req.into_command()).await?;
    Ok((StatusCode::CREATED, Json(SignUpResponse::from(result))))
}

/// POST /api/auth/signin - Exchange email and password for a session
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let session = state
        .sign_in_handler()
        .handle(SignInCommand {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(SignInResponse {
        access_token: session.access_token.expose_secret().clone(),
        token_type: "bearer",
        expires_in: session.expires_in,
        user: session.user.into(),
    }))
}

/// POST /api/auth/signout - Revoke the caller's session
pub async fn sign_out(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, ApiError> {
    state.sign_out_handler().handle(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me - The identity behind the caller's token
pub async fn current_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .current_user_handler()
        .handle(&token)
        .await?
        .ok_or(AuthError::InvalidToken)?;
    Ok(Json(user.into()))
}

/// GET /api/profile - The caller's profile, provisioned on first access
pub async fn get_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Json<ProfileResponse> {
    let provisioning = state.provisioner().ensure_profile(&user.id).await;
    Json(ProfileResponse::from_provisioning(provisioning, &user.id))
}
