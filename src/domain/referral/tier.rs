//! Reward tier ladder and progress computation.

use serde::{Deserialize, Serialize};

/// Points credited to a referrer per successful referral.
pub const POINTS_PER_REFERRAL: i64 = 30;

/// Tier shown when the catalog is empty or the user is below every threshold.
pub const DEFAULT_TIER: &str = "Dream Starter";

/// Next tier shown when no catalog is available.
pub const DEFAULT_NEXT_TIER: &str = "Dream Advocate";

/// Successful referrals needed for [`DEFAULT_NEXT_TIER`].
pub const DEFAULT_NEXT_TIER_THRESHOLD: i64 = 3;

/// Sentinel next tier for users at the top of the ladder.
pub const MAX_TIER_REACHED: &str = "Max Tier Reached";

/// A named rank unlocked by a minimum number of successful referrals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTier {
    pub name: String,
    pub min_referrals: i64,
}

impl RewardTier {
    pub fn new(name: impl Into<String>, min_referrals: i64) -> Self {
        Self {
            name: name.into(),
            min_referrals,
        }
    }
}

/// Where a user stands on the tier ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProgress {
    pub current_tier: String,
    pub next_tier: String,
    pub points_to_next_tier: i64,
}

impl TierProgress {
    /// Progress reported when the catalog is unavailable.
    pub fn fallback() -> Self {
        Self {
            current_tier: DEFAULT_TIER.to_string(),
            next_tier: DEFAULT_NEXT_TIER.to_string(),
            points_to_next_tier: DEFAULT_NEXT_TIER_THRESHOLD * POINTS_PER_REFERRAL,
        }
    }

    pub fn is_max_tier(&self) -> bool {
        self.next_tier == MAX_TIER_REACHED
    }
}

impl Default for TierProgress {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Tier catalog ordered by ascending threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierCatalog {
    tiers: Vec<RewardTier>,
}

impl TierCatalog {
    /// Sorts the given tiers by threshold. Equal thresholds keep input order.
    pub fn new(mut tiers: Vec<RewardTier>) -> Self {
        tiers.sort_by_key(|t| t.min_referrals);
        Self { tiers }
    }

    pub fn tiers(&self) -> &[RewardTier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Index of the highest tier whose threshold is met, if any.
    fn current_index(&self, successful_referrals: i64) -> Option<usize> {
        let mut current = None;
        for (i, tier) in self.tiers.iter().enumerate() {
            if successful_referrals >= tier.min_referrals {
                current = Some(i);
            } else {
                break;
            }
        }
        current
    }

    /// 0 below every threshold, otherwise 1 + position of the current tier.
    pub fn current_rank(&self, successful_referrals: i64) -> usize {
        self.current_index(successful_referrals)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Computes current tier, next tier and the points still needed.
    pub fn progress_for(&self, successful_referrals: i64, points_per_referral: i64) -> TierProgress {
        if self.tiers.is_empty() {
            return TierProgress::fallback();
        }

        let (current_tier, next) = match self.current_index(successful_referrals) {
            Some(i) => (self.tiers[i].name.clone(), self.tiers.get(i + 1)),
            None => (DEFAULT_TIER.to_string(), self.tiers.first()),
        };

        match next {
            Some(next) => TierProgress {
                current_tier,
                next_tier: next.name.clone(),
                points_to_next_tier: (next.min_referrals - successful_referrals).max(0)
                    * points_per_referral,
            },
            None => TierProgress {
                current_tier,
                next_tier: MAX_TIER_REACHED.to_string(),
                points_to_next_tier: 0,
            },
        }
    }

    /// Name of the tier held with `successful_referrals`.
    pub fn tier_name_for(&self, successful_referrals: i64) -> String {
        self.current_index(successful_referrals)
            .map(|i| self.tiers[i].name.clone())
            .unwrap_or_else(|| DEFAULT_TIER.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ladder() -> TierCatalog {
        TierCatalog::new(vec![
            RewardTier::new("Dream Starter", 0),
            RewardTier::new("Dream Advocate", 3),
            RewardTier::new("Dream Champion", 10),
        ])
    }

    #[test]
    fn met_threshold_is_current_tier() {
        let p = ladder().progress_for(3, POINTS_PER_REFERRAL);
        assert_eq!(p.current_tier, "Dream Advocate");
        assert_eq!(p.next_tier, "Dream Champion");
        assert_eq!(p.points_to_next_tier, 210);
    }

    #[test]
    fn new_user_starts_at_bottom() {
        let p = ladder().progress_for(0, POINTS_PER_REFERRAL);
        assert_eq!(p.current_tier, "Dream Starter");
        assert_eq!(p.next_tier, "Dream Advocate");
        assert_eq!(p.points_to_next_tier, 90);
    }

    #[test]
    fn beyond_last_threshold_is_max_tier() {
        let p = ladder().progress_for(15, POINTS_PER_REFERRAL);
        assert_eq!(p.current_tier, "Dream Champion");
        assert_eq!(p.next_tier, "Max Tier Reached");
        assert_eq!(p.points_to_next_tier, 0);
        assert!(p.is_max_tier());
    }

    #[test]
    fn empty_catalog_uses_fallback() {
        let p = TierCatalog::default().progress_for(7, POINTS_PER_REFERRAL);
        assert_eq!(p, TierProgress::fallback());
        assert_eq!(p.points_to_next_tier, 90);
    }

    #[test]
    fn below_every_threshold_points_at_first_tier() {
        let catalog = TierCatalog::new(vec![
            RewardTier::new("Bronze", 2),
            RewardTier::new("Silver", 5),
        ]);
        let p = catalog.progress_for(1, POINTS_PER_REFERRAL);
        assert_eq!(p.current_tier, DEFAULT_TIER);
        assert_eq!(p.next_tier, "Bronze");
        assert_eq!(p.points_to_next_tier, 30);
        assert_eq!(catalog.current_rank(1), 0);
    }

    #[test]
    fn catalog_is_sorted_on_construction() {
        let catalog = TierCatalog::new(vec![
            RewardTier::new("Dream Champion", 10),
            RewardTier::new("Dream Starter", 0),
            RewardTier::new("Dream Advocate", 3),
        ]);
        assert_eq!(catalog, ladder());
    }

    #[test]
    fn tier_name_for_follows_thresholds() {
        let catalog = ladder();
        assert_eq!(catalog.tier_name_for(2), "Dream Starter");
        assert_eq!(catalog.tier_name_for(10), "Dream Champion");
    }

    fn arb_catalog() -> impl Strategy<Value = TierCatalog> {
        prop::collection::vec(0i64..50, 0..8).prop_map(|thresholds| {
            TierCatalog::new(
                thresholds
                    .into_iter()
                    .enumerate()
                    .map(|(i, t)| RewardTier::new(format!("Tier {}", i), t))
                    .collect(),
            )
        })
    }

    proptest! {
        #[test]
        fn rank_never_decreases_with_more_referrals(
            catalog in arb_catalog(),
            a in 0i64..100,
            b in 0i64..100,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(catalog.current_rank(lo) <= catalog.current_rank(hi));
        }

        #[test]
        fn points_to_next_are_never_negative(catalog in arb_catalog(), n in 0i64..100) {
            let p = catalog.progress_for(n, POINTS_PER_REFERRAL);
            prop_assert!(p.points_to_next_tier >= 0);
            if p.is_max_tier() {
                prop_assert_eq!(p.points_to_next_tier, 0);
            }
        }
    }
}
