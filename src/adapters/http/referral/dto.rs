//! HTTP DTOs for referral endpoints.

use serde::{Deserialize, Serialize};

use crate::application::{ConfirmReferralResult, StepOutcome};
use crate::domain::referral::{ReferralCode, ReferralData, ReferralStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferralCodeResponse {
    pub code: String,
    pub share_link: String,
}

impl ReferralCodeResponse {
    pub fn new(code: &ReferralCode, share_link: String) -> Self {
        Self {
            code: code.as_str().to_string(),
            share_link,
        }
    }
}

/// The caller's code (if any) plus their referral dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ReferralOverviewResponse {
    pub referral_code: Option<ReferralCodeResponse>,
    #[serde(flatten)]
    pub data: ReferralData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmReferralResponse {
    pub referred_id: String,
    pub status: ReferralStatus,
    pub reward_points: i64,
    pub already_active: bool,
    pub tier_refresh: StepOutcome,
}

impl From<ConfirmReferralResult> for ConfirmReferralResponse {
    fn from(result: ConfirmReferralResult) -> Self {
        Self {
            referred_id: result.referral.referred_id.to_string(),
            status: result.referral.status,
            reward_points: result.referral.reward_points,
            already_active: result.already_active,
            tier_refresh: result.tier_refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_flattens_dashboard_fields() {
        let response = ReferralOverviewResponse {
            referral_code: None,
            data: ReferralData::default(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("referral_code").unwrap().is_null());
        assert_eq!(json["total_referrals"], 0);
        assert!(json.get("current_tier").is_some());
    }
}
