//! ReferralValidator - checks codes entered by prospective users.
//!
//! Never fails: every outcome, including store outages, is a structured
//! result with a user-facing message.

use std::sync::Arc;

use crate::domain::referral::{ReferralCode, ReferralValidationResult};
use crate::ports::ReferralCodeStore;

pub struct ReferralValidator {
    codes: Arc<dyn ReferralCodeStore>,
}

impl ReferralValidator {
    pub fn new(codes: Arc<dyn ReferralCodeStore>) -> Self {
        Self { codes }
    }

    pub async fn validate_referral_code(&self, raw: &str) -> ReferralValidationResult {
        let Ok(code) = ReferralCode::parse(raw) else {
            return ReferralValidationResult::empty_code();
        };

        let rows = match self.codes.validate_code_public(&code).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(code = %code, "Referral code validation failed: {}", e);
                return ReferralValidationResult::unavailable();
            }
        };

        match rows.into_iter().next() {
            Some(row) if row.is_valid => ReferralValidationResult::valid(
                row.referrer_id,
                row.referrer_name,
                row.message.unwrap_or_default(),
            ),
            Some(row) => ReferralValidationResult::invalid(row.message.unwrap_or_default()),
            None => ReferralValidationResult::unknown_code(),
        }
    }

    /// True only for an existing active code. Errors read as `false`.
    pub async fn check_referral_code_exists(&self, raw: &str) -> bool {
        let Ok(code) = ReferralCode::parse(raw) else {
            return false;
        };
        match self.codes.active_code_exists(&code).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(code = %code, "Referral code lookup failed: {}", e);
                false
            }
        }
    }
}
