//! Aggregated referral dashboard data.

use serde::{Deserialize, Serialize};

use super::referral::{ReferralHistoryRecord, ReferralStatus};
use super::rewards::UserRewards;
use super::tier::TierProgress;

/// Name shown for referred users without a profile name.
pub const ANONYMOUS_USER: &str = "Anonymous User";

/// One row of a user's referral history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralHistoryEntry {
    pub name: String,
    pub status: ReferralStatus,
    /// Join date, `MM/DD/YYYY`.
    pub join_date: String,
    pub reward_points: i64,
}

impl From<ReferralHistoryRecord> for ReferralHistoryEntry {
    fn from(record: ReferralHistoryRecord) -> Self {
        let name = record
            .referred_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_USER.to_string());
        Self {
            name,
            status: record.referral.status,
            join_date: record.referral.created_at.format_date(),
            reward_points: record.referral.reward_points,
        }
    }
}

/// Part of [`ReferralData`] that could not be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralDataSlice {
    Rewards,
    History,
    Tiers,
}

/// Everything the referral dashboard shows for one user.
///
/// Always complete: slices that failed to load hold zero/default values and
/// are listed in `unavailable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralData {
    pub total_referrals: i64,
    pub successful_referrals: i64,
    pub pending_referrals: i64,
    pub rewards_earned: i64,
    pub current_tier: String,
    pub next_tier: String,
    pub points_to_next_tier: i64,
    pub referral_history: Vec<ReferralHistoryEntry>,
    pub unavailable: Vec<ReferralDataSlice>,
}

impl ReferralData {
    /// Assembles the aggregate from whatever slices were loaded.
    ///
    /// `history` must already be ordered newest first.
    pub fn assemble(
        rewards: Option<&UserRewards>,
        progress: TierProgress,
        history: Vec<ReferralHistoryEntry>,
        unavailable: Vec<ReferralDataSlice>,
    ) -> Self {
        let (total, successful, points) = rewards
            .map(|r| (r.total_referrals, r.successful_referrals, r.total_points))
            .unwrap_or((0, 0, 0));
        Self {
            total_referrals: total,
            successful_referrals: successful,
            pending_referrals: (total - successful).max(0),
            rewards_earned: points,
            current_tier: progress.current_tier,
            next_tier: progress.next_tier,
            points_to_next_tier: progress.points_to_next_tier,
            referral_history: history,
            unavailable,
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.unavailable.is_empty()
    }
}

impl Default for ReferralData {
    fn default() -> Self {
        Self::assemble(None, TierProgress::fallback(), Vec::new(), Vec::new())
    }
}
