//! Referral handlers.
//!
//! ## Commands
//! - Generating and initializing referral codes
//! - Recording a referral at signup
//! - Confirming a referral and crediting the referrer
//!
//! ## Queries
//! - Validating a code, checking existence
//! - Referral dashboard data

mod code_manager;
mod confirm_referral;
mod get_referral_data;
mod record_referral;
mod validator;

// Commands
pub use code_manager::ReferralCodeManager;
pub use confirm_referral::{
    ConfirmReferralCommand, ConfirmReferralHandler, ConfirmReferralResult,
};
pub use record_referral::{RecordReferralCommand, RecordReferralHandler, RecordReferralResult};

// Queries
pub use get_referral_data::{GetReferralDataHandler, GetReferralDataQuery};
pub use validator::ReferralValidator;
