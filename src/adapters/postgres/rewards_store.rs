//! PostgreSQL implementation of RewardsStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, parse_user_id_as_uuid, user_id_from_uuid};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::referral::{RewardTier, UserRewards, DEFAULT_TIER};
use crate::ports::RewardsStore;

pub struct PostgresRewardsStore {
    pool: PgPool,
}

impl PostgresRewardsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct RewardsRow {
    user_id: Uuid,
    total_points: i64,
    current_tier: String,
    total_referrals: i64,
    successful_referrals: i64,
    updated_at: DateTime<Utc>,
}

impl From<RewardsRow> for UserRewards {
    fn from(row: RewardsRow) -> Self {
        UserRewards {
            user_id: user_id_from_uuid(row.user_id),
            total_points: row.total_points,
            current_tier: row.current_tier,
            total_referrals: row.total_referrals,
            successful_referrals: row.successful_referrals,
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TierRow {
    name: String,
    min_referrals: i64,
}

#[async_trait]
impl RewardsStore for PostgresRewardsStore {
    async fn find_rewards(&self, user_id: &UserId) -> Result<Option<UserRewards>, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let row: Option<RewardsRow> = sqlx::query_as(
            r#"
            SELECT user_id, total_points, current_tier, total_referrals,
                   successful_referrals, updated_at
            FROM user_rewards
            WHERE user_id = $1
            "#,
        )
        .bind(user_uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read rewards", e))?;

        Ok(row.map(UserRewards::from))
    }

    async fn upsert_rewards(&self, rewards: &UserRewards) -> Result<(), DomainError> {
        let user_uuid = parse_user_id_as_uuid(&rewards.user_id)?;

        sqlx::query(
            r#"
            INSERT INTO user_rewards (
                user_id, total_points, current_tier, total_referrals,
                successful_referrals, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                total_points = EXCLUDED.total_points,
                current_tier = EXCLUDED.current_tier,
                total_referrals = EXCLUDED.total_referrals,
                successful_referrals = EXCLUDED.successful_referrals,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_uuid)
        .bind(rewards.total_points)
        .bind(&rewards.current_tier)
        .bind(rewards.total_referrals)
        .bind(rewards.successful_referrals)
        .bind(rewards.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save rewards", e))?;

        Ok(())
    }

    async fn increment_total_referrals(
        &self,
        user_id: &UserId,
    ) -> Result<UserRewards, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let row: RewardsRow = sqlx::query_as(
            r#"
            INSERT INTO user_rewards (
                user_id, total_points, current_tier, total_referrals,
                successful_referrals, updated_at
            ) VALUES ($1, 0, $2, 1, 0, now())
            ON CONFLICT (user_id) DO UPDATE SET
                total_referrals = user_rewards.total_referrals + 1,
                updated_at = now()
            RETURNING user_id, total_points, current_tier, total_referrals,
                      successful_referrals, updated_at
            "#,
        )
        .bind(user_uuid)
        .bind(DEFAULT_TIER)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count referral", e))?;

        Ok(row.into())
    }

    async fn refresh_tier(
        &self,
        user_id: &UserId,
        tier: &str,
        successful_referrals: i64,
    ) -> Result<bool, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let result = sqlx::query(
            r#"
            UPDATE user_rewards
            SET current_tier = $2, updated_at = now()
            WHERE user_id = $1 AND successful_referrals = $3
            "#,
        )
        .bind(user_uuid)
        .bind(tier)
        .bind(successful_referrals)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update reward tier", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn initialize_rewards(&self, rewards: &UserRewards) -> Result<bool, DomainError> {
        let user_uuid = parse_user_id_as_uuid(&rewards.user_id)?;

        let result = sqlx::query(
            r#"
            INSERT INTO user_rewards (
                user_id, total_points, current_tier, total_referrals,
                successful_referrals, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_uuid)
        .bind(rewards.total_points)
        .bind(&rewards.current_tier)
        .bind(rewards.total_referrals)
        .bind(rewards.successful_referrals)
        .bind(rewards.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to initialize rewards", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_tiers(&self) -> Result<Vec<RewardTier>, DomainError> {
        let rows: Vec<TierRow> = sqlx::query_as(
            "SELECT name, min_referrals FROM reward_tiers ORDER BY min_referrals ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list reward tiers", e))?;

        Ok(rows
            .into_iter()
            .map(|row| RewardTier::new(row.name, row.min_referrals))
            .collect())
    }
}
