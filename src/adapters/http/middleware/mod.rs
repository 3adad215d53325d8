//! HTTP middleware for axum.
//!
//! - `auth` - Bearer-token resolution and authentication extractors

pub mod auth;

pub use auth::{auth_middleware, AuthState, BearerToken, RequireAuth};
