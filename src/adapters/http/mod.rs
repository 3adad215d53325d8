//! HTTP adapter - the REST surface.
//!
//! ```text
//! /health                          liveness, no auth
//! /api/auth/{signup,signin,signout,me}
//! /api/profile                     caller's profile (provisioned on read)
//! /api/referrals/...               codes, validation, dashboard, confirm
//! ```
//!
//! Every `/api` route runs behind [`middleware::auth_middleware`]; handlers
//! that need a caller use the `RequireAuth` extractor.

pub mod account;
pub mod error;
pub mod middleware;
pub mod referral;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use state::{AppSettings, AppState};

use axum::{http::HeaderValue, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;

/// Builds the application router.
pub fn api_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", account::auth_routes())
        .nest("/profile", account::profile_routes())
        .nest("/referrals", referral::referral_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.auth.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

/// Adds tracing, CORS and the request timeout.
pub fn with_http_layers(router: Router, config: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
