//! HTTP routes for referral endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{code_exists, confirm_referral, get_overview, initialize_code, validate_code};

/// Mounted at `/api/referrals`.
pub fn referral_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_overview))
        .route("/code", post(initialize_code))
        .route("/validate/:code", get(validate_code))
        .route("/exists/:code", get(code_exists))
        .route("/confirm", post(confirm_referral))
}
