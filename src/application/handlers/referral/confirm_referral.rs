//! ConfirmReferralHandler - activates a pending referral and credits the
//! referrer.

use std::sync::Arc;

use crate::application::StepOutcome;
use crate::domain::foundation::UserId;
use crate::domain::referral::{
    Referral, ReferralError, ReferralStatus, TierCatalog, UserRewards,
};
use crate::ports::{ReferralRepository, RewardsStore};

#[derive(Debug, Clone)]
pub struct ConfirmReferralCommand {
    /// The referred user whose activity is being confirmed.
    pub referred_id: UserId,
}

#[derive(Debug, Clone)]
pub struct ConfirmReferralResult {
    pub referral: Referral,
    /// True when the referral was already active and nothing changed.
    pub already_active: bool,
    /// Refresh of the referrer's tier name after the credit.
    pub tier_refresh: StepOutcome,
}

pub struct ConfirmReferralHandler {
    referrals: Arc<dyn ReferralRepository>,
    rewards: Arc<dyn RewardsStore>,
}

impl ConfirmReferralHandler {
    pub fn new(referrals: Arc<dyn ReferralRepository>, rewards: Arc<dyn RewardsStore>) -> Self {
        Self { referrals, rewards }
    }

    /// Activation and credit are written together. A store failure leaves
    /// the referral pending so the confirmation can be retried.
    pub async fn handle(
        &self,
        cmd: ConfirmReferralCommand,
    ) -> Result<ConfirmReferralResult, ReferralError> {
        // 1. Load
        let mut referral = self
            .referrals
            .find_by_referred(&cmd.referred_id)
            .await?
            .ok_or(ReferralError::NotFound)?;

        // 2. Confirming twice is a no-op
        if referral.status == ReferralStatus::Active {
            return Ok(Self::already_active(referral));
        }

        // 3. pending -> active, checked before touching the store
        let pending = referral.clone();
        referral.activate()?;

        // 4. Flip and credit in one store write
        let Some(ledger) = self.referrals.activate_and_credit(&pending).await? else {
            tracing::debug!(referred_id = %cmd.referred_id, "Referral confirmed concurrently");
            return Ok(Self::already_active(referral));
        };

        // 5. Tier name follows the new successful count
        let tier_refresh = self.refresh_tier(&ledger).await;

        tracing::info!(
            referrer_id = %referral.referrer_id,
            referred_id = %referral.referred_id,
            points = referral.reward_points,
            "Referral confirmed"
        );
        Ok(ConfirmReferralResult {
            referral,
            already_active: false,
            tier_refresh,
        })
    }

    fn already_active(referral: Referral) -> ConfirmReferralResult {
        ConfirmReferralResult {
            referral,
            already_active: true,
            tier_refresh: StepOutcome::Unchanged,
        }
    }

    async fn refresh_tier(&self, ledger: &UserRewards) -> StepOutcome {
        let catalog = match self.rewards.list_tiers().await {
            Ok(tiers) => TierCatalog::new(tiers),
            Err(e) => {
                tracing::warn!("Failed to load reward tiers, keeping tier name: {}", e);
                return StepOutcome::failed(e);
            }
        };

        let tier = catalog.tier_name_for(ledger.successful_referrals);
        if tier == ledger.current_tier {
            return StepOutcome::Unchanged;
        }
        match self
            .rewards
            .refresh_tier(&ledger.user_id, &tier, ledger.successful_referrals)
            .await
        {
            Ok(true) => StepOutcome::Completed,
            // A later credit moved the count and sets its own tier
            Ok(false) => StepOutcome::Skipped,
            Err(e) => {
                tracing::warn!(user_id = %ledger.user_id, "Failed to update reward tier: {}", e);
                StepOutcome::failed(e)
            }
        }
    }
}
