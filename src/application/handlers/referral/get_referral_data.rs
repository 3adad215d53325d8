//! GetReferralDataHandler - Query handler for the referral dashboard.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::referral::{
    ReferralData, ReferralDataSlice, ReferralHistoryEntry, TierCatalog, POINTS_PER_REFERRAL,
};
use crate::ports::{ReferralRepository, RewardsStore};

/// Query for a user's referral totals, tier progress and history.
#[derive(Debug, Clone)]
pub struct GetReferralDataQuery {
    pub user_id: UserId,
}

/// Handler for the referral dashboard aggregate.
///
/// The ledger, history and tier reads run concurrently. A failed read is
/// logged, zeroed, and listed in `ReferralData::unavailable`.
pub struct GetReferralDataHandler {
    rewards: Arc<dyn RewardsStore>,
    referrals: Arc<dyn ReferralRepository>,
    points_per_referral: i64,
}

impl GetReferralDataHandler {
    pub fn new(rewards: Arc<dyn RewardsStore>, referrals: Arc<dyn ReferralRepository>) -> Self {
        Self {
            rewards,
            referrals,
            points_per_referral: POINTS_PER_REFERRAL,
        }
    }

    pub fn with_points_per_referral(mut self, points: i64) -> Self {
        self.points_per_referral = points;
        self
    }

    pub async fn handle(&self, query: GetReferralDataQuery) -> ReferralData {
        let user_id = &query.user_id;
        let (rewards, history, tiers) = futures::join!(
            self.rewards.find_rewards(user_id),
            self.referrals.list_history(user_id),
            self.rewards.list_tiers(),
        );

        let mut unavailable = Vec::new();

        let rewards = match rewards {
            Ok(rewards) => rewards,
            Err(e) => {
                tracing::warn!(user_id = %user_id, "Failed to load rewards: {}", e);
                unavailable.push(ReferralDataSlice::Rewards);
                None
            }
        };

        let history: Vec<ReferralHistoryEntry> = match history {
            Ok(records) => records.into_iter().map(ReferralHistoryEntry::from).collect(),
            Err(e) => {
                tracing::warn!(user_id = %user_id, "Failed to load referral history: {}", e);
                unavailable.push(ReferralDataSlice::History);
                Vec::new()
            }
        };

        let catalog = match tiers {
            Ok(tiers) => TierCatalog::new(tiers),
            Err(e) => {
                tracing::warn!("Failed to load reward tiers: {}", e);
                unavailable.push(ReferralDataSlice::Tiers);
                TierCatalog::default()
            }
        };

        let successful = rewards.as_ref().map(|r| r.successful_referrals).unwrap_or(0);
        let progress = catalog.progress_for(successful, self.points_per_referral);

        ReferralData::assemble(rewards.as_ref(), progress, history, unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryStore, StoreOp};
    use crate::domain::foundation::Timestamp;
    use crate::domain::referral::{Referral, ReferralStatus, RewardTier, UserRewards};
    use crate::domain::user::ProfileDraft;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn handler(store: &Arc<InMemoryStore>) -> GetReferralDataHandler {
        GetReferralDataHandler::new(store.clone(), store.clone())
    }

    fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.seed_tiers(vec![
            RewardTier::new("Dream Starter", 0),
            RewardTier::new("Dream Advocate", 3),
            RewardTier::new("Dream Champion", 10),
        ]);

        let referrer = uid("referrer");
        let mut rewards = UserRewards::new(referrer.clone());
        rewards.total_referrals = 4;
        rewards.successful_referrals = 3;
        rewards.total_points = 90;
        store.seed_rewards(rewards);

        let mut old = Referral::pending(referrer.clone(), uid("old")).unwrap();
        old.created_at = Timestamp::now().minus_days(10);
        old.status = ReferralStatus::Active;
        store.seed_referral(old);
        store.seed_referral(Referral::pending(referrer, uid("new")).unwrap());

        let mut draft = ProfileDraft::minimal(uid("old"));
        draft.name = "Olga".to_string();
        store.seed_profile(draft);
        store
    }

    #[tokio::test]
    async fn aggregates_totals_tiers_and_history() {
        let store = seeded_store();
        let data = handler(&store)
            .handle(GetReferralDataQuery {
                user_id: uid("referrer"),
            })
            .await;

        assert_eq!(data.total_referrals, 4);
        assert_eq!(data.successful_referrals, 3);
        assert_eq!(data.pending_referrals, 1);
        assert_eq!(data.rewards_earned, 90);
        assert_eq!(data.current_tier, "Dream Advocate");
        assert_eq!(data.next_tier, "Dream Champion");
        assert_eq!(data.points_to_next_tier, 210);

        assert_eq!(data.referral_history.len(), 2);
        assert_eq!(data.referral_history[0].name, "Anonymous User");
        assert_eq!(data.referral_history[1].name, "Olga");
        assert_eq!(data.referral_history[1].status, ReferralStatus::Active);
        assert!(data.unavailable.is_empty());
    }

    #[tokio::test]
    async fn user_without_ledger_gets_zeroes() {
        let store = seeded_store();
        let data = handler(&store)
            .handle(GetReferralDataQuery {
                user_id: uid("nobody"),
            })
            .await;

        assert_eq!(data.total_referrals, 0);
        assert_eq!(data.current_tier, "Dream Starter");
        assert_eq!(data.next_tier, "Dream Advocate");
        assert_eq!(data.points_to_next_tier, 90);
        assert!(data.referral_history.is_empty());
        assert!(!data.is_partial());
    }

    #[tokio::test]
    async fn tier_failure_falls_back_to_defaults() {
        let store = seeded_store();
        store.fail(StoreOp::ListTiers);

        let data = handler(&store)
            .handle(GetReferralDataQuery {
                user_id: uid("referrer"),
            })
            .await;

        assert_eq!(data.current_tier, "Dream Starter");
        assert_eq!(data.next_tier, "Dream Advocate");
        assert_eq!(data.points_to_next_tier, 90);
        assert_eq!(data.total_referrals, 4);
        assert_eq!(data.unavailable, vec![ReferralDataSlice::Tiers]);
    }

    #[tokio::test]
    async fn every_slice_failing_still_returns_complete_data() {
        let store = seeded_store();
        store.fail(StoreOp::FindRewards);
        store.fail(StoreOp::ListReferralHistory);
        store.fail(StoreOp::ListTiers);

        let data = handler(&store)
            .handle(GetReferralDataQuery {
                user_id: uid("referrer"),
            })
            .await;

        assert_eq!(data.total_referrals, 0);
        assert_eq!(data.rewards_earned, 0);
        assert!(data.referral_history.is_empty());
        assert_eq!(data.unavailable.len(), 3);
        assert!(data.unavailable.contains(&ReferralDataSlice::Rewards));
        assert!(data.unavailable.contains(&ReferralDataSlice::History));
    }

    #[tokio::test]
    async fn custom_points_per_referral() {
        let store = seeded_store();
        let data = handler(&store)
            .with_points_per_referral(50)
            .handle(GetReferralDataQuery {
                user_id: uid("referrer"),
            })
            .await;
        assert_eq!(data.points_to_next_tier, 350);
    }
}
