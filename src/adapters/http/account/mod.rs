//! HTTP adapter for signup, sign-in and the caller's profile.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ProfileResponse, ProfileSource, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
};
pub use routes::{auth_routes, profile_routes};
