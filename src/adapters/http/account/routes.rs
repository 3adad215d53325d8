//! HTTP routes for account endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{current_user, get_profile, sign_in, sign_out, sign_up};

/// Mounted at `/api/auth`.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/signout", post(sign_out))
        .route("/me", get(current_user))
}

/// Mounted at `/api/profile`.
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/", get(get_profile))
}
