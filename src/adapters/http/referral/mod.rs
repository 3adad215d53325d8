//! HTTP adapter for referral codes, validation and the referral dashboard.

mod dto;
mod handlers;
mod routes;

pub use dto::{CodeExistsResponse, ConfirmReferralResponse, ReferralCodeResponse, ReferralOverviewResponse};
pub use routes::referral_routes;
