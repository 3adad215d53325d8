//! Referral program settings

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::referral::{POINTS_PER_REFERRAL, WELCOME_BONUS_POINTS};

#[derive(Debug, Clone, Deserialize)]
pub struct ReferralConfig {
    /// Points credited to a referrer per successful referral
    #[serde(default = "default_points_per_referral")]
    pub points_per_referral: i64,

    /// Points granted to a new user who signed up with a valid code
    #[serde(default = "default_welcome_bonus")]
    pub welcome_bonus: i64,

    /// Base of invite links, e.g. `https://dreamjournal.app`
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl ReferralConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.points_per_referral <= 0 {
            return Err(ValidationError::InvalidPoints("REFERRAL__POINTS_PER_REFERRAL"));
        }
        if self.welcome_bonus < 0 {
            return Err(ValidationError::InvalidPoints("REFERRAL__WELCOME_BONUS"));
        }
        if !self.public_base_url.starts_with("https://")
            && !self.public_base_url.starts_with("http://")
        {
            return Err(ValidationError::InvalidUrl("REFERRAL__PUBLIC_BASE_URL"));
        }
        Ok(())
    }
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            points_per_referral: default_points_per_referral(),
            welcome_bonus: default_welcome_bonus(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_points_per_referral() -> i64 {
    POINTS_PER_REFERRAL
}

fn default_welcome_bonus() -> i64 {
    WELCOME_BONUS_POINTS
}

fn default_public_base_url() -> String {
    "http://localhost:5173".to_string()
}
