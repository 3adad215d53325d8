//! Per-user reward ledger.

use serde::{Deserialize, Serialize};

use super::tier::{TierCatalog, DEFAULT_TIER};
use crate::domain::foundation::{Timestamp, UserId, ValidationError};

/// Points granted to a new user who signed up with a valid referral code.
pub const WELCOME_BONUS_POINTS: i64 = 10;

/// Cumulative points and referral counts for one user.
///
/// Invariants: `successful_referrals <= total_referrals`, and points only go
/// down through [`UserRewards::correct_points`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRewards {
    pub user_id: UserId,
    pub total_points: i64,
    pub current_tier: String,
    pub total_referrals: i64,
    pub successful_referrals: i64,
    pub updated_at: Timestamp,
}

impl UserRewards {
    /// An empty ledger at the bottom tier.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            total_points: 0,
            current_tier: DEFAULT_TIER.to_string(),
            total_referrals: 0,
            successful_referrals: 0,
            updated_at: Timestamp::now(),
        }
    }

    /// A new ledger seeded with `bonus` points.
    pub fn with_welcome_bonus(user_id: UserId, bonus: i64) -> Self {
        let mut rewards = Self::new(user_id);
        rewards.total_points = bonus.max(0);
        rewards
    }

    /// Adds points. Negative amounts are ignored; use `correct_points`.
    pub fn grant_points(&mut self, points: i64) {
        if points > 0 {
            self.total_points += points;
            self.touch();
        }
    }

    /// Counts a newly attributed (pending) referral.
    pub fn record_referral(&mut self) {
        self.total_referrals += 1;
        self.touch();
    }

    /// Counts a confirmed referral, credits its points and refreshes the tier.
    ///
    /// A confirmation without a matching recorded referral also bumps
    /// `total_referrals` so the ledger invariant holds.
    pub fn record_successful_referral(&mut self, points: i64, catalog: &TierCatalog) {
        self.credit_successful_referral(points);
        self.current_tier = catalog.tier_name_for(self.successful_referrals);
    }

    /// Counts a confirmed referral and credits its points, leaving the tier
    /// name as stored.
    pub fn credit_successful_referral(&mut self, points: i64) {
        self.successful_referrals += 1;
        if self.successful_referrals > self.total_referrals {
            self.total_referrals = self.successful_referrals;
        }
        self.total_points += points.max(0);
        self.touch();
    }

    pub fn pending_referrals(&self) -> i64 {
        (self.total_referrals - self.successful_referrals).max(0)
    }

    /// Explicit correction; the only way points may decrease.
    pub fn correct_points(&mut self, new_total: i64) -> Result<(), ValidationError> {
        if new_total < 0 {
            return Err(ValidationError::out_of_range(
                "total_points",
                0,
                i32::MAX,
                new_total.clamp(i32::MIN as i64, 0) as i32,
            ));
        }
        self.total_points = new_total;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::referral::tier::RewardTier;

    fn uid() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn catalog() -> TierCatalog {
        TierCatalog::new(vec![
            RewardTier::new("Dream Starter", 0),
            RewardTier::new("Dream Advocate", 1),
        ])
    }

    #[test]
    fn new_ledger_is_empty() {
        let r = UserRewards::new(uid());
        assert_eq!(r.total_points, 0);
        assert_eq!(r.current_tier, "Dream Starter");
        assert_eq!(r.pending_referrals(), 0);
    }

    #[test]
    fn welcome_bonus_seeds_points() {
        let r = UserRewards::with_welcome_bonus(uid(), WELCOME_BONUS_POINTS);
        assert_eq!(r.total_points, 10);
    }

    #[test]
    fn grant_points_ignores_negative_amounts() {
        let mut r = UserRewards::new(uid());
        r.grant_points(30);
        r.grant_points(-100);
        assert_eq!(r.total_points, 30);
    }

    #[test]
    fn successful_referral_updates_counts_points_and_tier() {
        let mut r = UserRewards::new(uid());
        r.record_referral();
        r.record_referral();
        assert_eq!(r.pending_referrals(), 2);

        r.record_successful_referral(30, &catalog());
        assert_eq!(r.successful_referrals, 1);
        assert_eq!(r.total_referrals, 2);
        assert_eq!(r.pending_referrals(), 1);
        assert_eq!(r.total_points, 30);
        assert_eq!(r.current_tier, "Dream Advocate");
    }

    #[test]
    fn successful_never_exceeds_total() {
        let mut r = UserRewards::new(uid());
        r.record_successful_referral(30, &catalog());
        assert!(r.successful_referrals <= r.total_referrals);
    }

    #[test]
    fn credit_keeps_stored_tier_name() {
        let mut r = UserRewards::new(uid());
        r.credit_successful_referral(30);
        assert_eq!(r.successful_referrals, 1);
        assert_eq!(r.total_referrals, 1);
        assert_eq!(r.total_points, 30);
        assert_eq!(r.current_tier, "Dream Starter");
    }

    #[test]
    fn correction_can_lower_points_but_not_below_zero() {
        let mut r = UserRewards::with_welcome_bonus(uid(), 50);
        r.correct_points(20).unwrap();
        assert_eq!(r.total_points, 20);
        assert!(r.correct_points(-1).is_err());
        assert_eq!(r.total_points, 20);
    }
}
