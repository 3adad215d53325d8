//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
mod outcome;
mod retry;

pub use handlers::auth::{
    CurrentUserHandler, ProfileCreation, ProfilePreferences, SignInCommand, SignInHandler,
    SignOutHandler, SignUpCommand, SignUpError, SignUpHandler, SignUpResult,
};
pub use handlers::referral::{
    ConfirmReferralCommand, ConfirmReferralHandler, ConfirmReferralResult, GetReferralDataHandler,
    GetReferralDataQuery, RecordReferralCommand, RecordReferralHandler, RecordReferralResult,
    ReferralCodeManager, ReferralValidator,
};
pub use handlers::user::{FallbackReport, ProfileProvisioner, ProfileProvisioning};
pub use outcome::StepOutcome;
pub use retry::RetryPolicy;
