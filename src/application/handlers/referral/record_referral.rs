//! RecordReferralHandler - attributes a new user to their referrer.

use std::sync::Arc;

use crate::application::StepOutcome;
use crate::domain::foundation::UserId;
use crate::domain::referral::{Referral, ReferralError, POINTS_PER_REFERRAL};
use crate::ports::{ReferralRepository, RewardsStore};

#[derive(Debug, Clone)]
pub struct RecordReferralCommand {
    pub referrer_id: UserId,
    pub referred_id: UserId,
}

#[derive(Debug, Clone)]
pub struct RecordReferralResult {
    pub referral: Referral,
    /// Update of the referrer's `total_referrals`.
    pub referrer_ledger: StepOutcome,
}

/// Creates a pending referral and counts it on the referrer's ledger.
pub struct RecordReferralHandler {
    referrals: Arc<dyn ReferralRepository>,
    rewards: Arc<dyn RewardsStore>,
    points_per_referral: i64,
}

impl RecordReferralHandler {
    pub fn new(referrals: Arc<dyn ReferralRepository>, rewards: Arc<dyn RewardsStore>) -> Self {
        Self {
            referrals,
            rewards,
            points_per_referral: POINTS_PER_REFERRAL,
        }
    }

    pub fn with_points_per_referral(mut self, points: i64) -> Self {
        self.points_per_referral = points;
        self
    }

    pub async fn handle(
        &self,
        cmd: RecordReferralCommand,
    ) -> Result<RecordReferralResult, ReferralError> {
        // 1. Build the edge (rejects self-referral)
        let referral = Referral::pending_with_points(
            cmd.referrer_id.clone(),
            cmd.referred_id.clone(),
            self.points_per_referral,
        )?;

        // 2. A referred user has at most one referral
        if self.referrals.find_by_referred(&cmd.referred_id).await?.is_some() {
            return Err(ReferralError::AlreadyReferred);
        }
        self.referrals.save(&referral).await.map_err(|e| {
            if e.is_conflict() {
                ReferralError::AlreadyReferred
            } else {
                ReferralError::Store(e)
            }
        })?;

        // 3. Count it on the referrer's ledger
        let referrer_ledger = self.count_on_ledger(&cmd.referrer_id).await;

        tracing::info!(
            referrer_id = %cmd.referrer_id,
            referred_id = %cmd.referred_id,
            "Referral recorded"
        );
        Ok(RecordReferralResult {
            referral,
            referrer_ledger,
        })
    }

    async fn count_on_ledger(&self, referrer_id: &UserId) -> StepOutcome {
        match self.rewards.increment_total_referrals(referrer_id).await {
            Ok(_) => StepOutcome::Completed,
            Err(e) => {
                tracing::warn!(user_id = %referrer_id, "Failed to update referrer rewards: {}", e);
                StepOutcome::failed(e)
            }
        }
    }
}
