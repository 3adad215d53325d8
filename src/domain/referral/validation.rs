//! Outcome of validating a referral code.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

pub const MSG_EMPTY_CODE: &str = "Please enter a referral code";
pub const MSG_INVALID_FORMAT: &str = "Invalid referral code format";
pub const MSG_VALIDATION_UNAVAILABLE: &str =
    "Unable to validate referral code. Please try again later.";
pub const MSG_VALID_CODE: &str = "Valid referral code";

/// Structured validation result. `referrer_id` is only set when valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralValidationResult {
    pub is_valid: bool,
    pub referrer_name: Option<String>,
    pub referrer_id: Option<UserId>,
    pub message: String,
}

impl ReferralValidationResult {
    pub fn valid(
        referrer_id: Option<UserId>,
        referrer_name: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            is_valid: true,
            referrer_name,
            referrer_id,
            message: if message.trim().is_empty() {
                MSG_VALID_CODE.to_string()
            } else {
                message
            },
        }
    }

    /// An invalid result; blank messages fall back to the format message.
    pub fn invalid(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            is_valid: false,
            referrer_name: None,
            referrer_id: None,
            message: if message.trim().is_empty() {
                MSG_INVALID_FORMAT.to_string()
            } else {
                message
            },
        }
    }

    pub fn empty_code() -> Self {
        Self::invalid(MSG_EMPTY_CODE)
    }

    pub fn unknown_code() -> Self {
        Self::invalid(MSG_INVALID_FORMAT)
    }

    pub fn unavailable() -> Self {
        Self::invalid(MSG_VALIDATION_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_results_never_carry_referrer() {
        for r in [
            ReferralValidationResult::empty_code(),
            ReferralValidationResult::unknown_code(),
            ReferralValidationResult::unavailable(),
            ReferralValidationResult::invalid(""),
        ] {
            assert!(!r.is_valid);
            assert!(r.referrer_id.is_none());
            assert!(!r.message.is_empty());
        }
    }

    #[test]
    fn valid_result_carries_referrer() {
        let r = ReferralValidationResult::valid(
            Some(UserId::new("ref").unwrap()),
            Some("Jo".into()),
            "",
        );
        assert!(r.is_valid);
        assert_eq!(r.referrer_id.unwrap().as_str(), "ref");
        assert_eq!(r.message, MSG_VALID_CODE);
    }
}
