//! RewardsStore port for reward ledgers and the tier catalog.

use async_trait::async_trait;

use crate::domain::{
    foundation::{DomainError, UserId},
    referral::{RewardTier, UserRewards},
};

#[async_trait]
pub trait RewardsStore: Send + Sync {
    async fn find_rewards(&self, user_id: &UserId) -> Result<Option<UserRewards>, DomainError>;

    /// Insert or overwrite keyed by user.
    async fn upsert_rewards(&self, rewards: &UserRewards) -> Result<(), DomainError>;

    /// Adds one to `total_referrals` in a single store-side update, creating
    /// an empty ledger first when the user has none. Returns the updated row.
    async fn increment_total_referrals(&self, user_id: &UserId)
        -> Result<UserRewards, DomainError>;

    /// Sets `current_tier` only while the ledger still holds
    /// `successful_referrals` confirmed referrals.
    ///
    /// Returns `false` when the count has moved on, in which case the later
    /// credit owns the tier.
    async fn refresh_tier(
        &self,
        user_id: &UserId,
        tier: &str,
        successful_referrals: i64,
    ) -> Result<bool, DomainError>;

    /// Inserts `rewards` only if the user has no ledger yet.
    ///
    /// Returns `true` when a row was created. Existing ledgers are untouched.
    async fn initialize_rewards(&self, rewards: &UserRewards) -> Result<bool, DomainError>;

    /// The tier catalog, ascending by threshold.
    async fn list_tiers(&self) -> Result<Vec<RewardTier>, DomainError>;
}
