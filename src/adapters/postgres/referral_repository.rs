//! PostgreSQL implementation of ReferralRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::rewards_store::RewardsRow;
use super::{corrupt_row, db_error, map_write_error, parse_user_id_as_uuid, user_id_from_uuid};
use crate::domain::foundation::{DomainError, ErrorCode, ReferralId, Timestamp, UserId};
use crate::domain::referral::{
    Referral, ReferralHistoryRecord, ReferralStatus, UserRewards, DEFAULT_TIER,
};
use crate::ports::ReferralRepository;

pub struct PostgresReferralRepository {
    pool: PgPool,
}

impl PostgresReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReferralRow {
    id: Uuid,
    referrer_id: Uuid,
    referred_id: Uuid,
    status: String,
    reward_points: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReferralRow> for Referral {
    type Error = DomainError;

    fn try_from(row: ReferralRow) -> Result<Self, Self::Error> {
        Ok(Referral {
            id: ReferralId::from_uuid(row.id),
            referrer_id: user_id_from_uuid(row.referrer_id),
            referred_id: user_id_from_uuid(row.referred_id),
            status: ReferralStatus::parse(&row.status).map_err(|e| corrupt_row("status", e))?,
            reward_points: row.reward_points,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    #[sqlx(flatten)]
    referral: ReferralRow,
    referred_name: Option<String>,
}

#[async_trait]
impl ReferralRepository for PostgresReferralRepository {
    async fn find_by_referred(
        &self,
        referred_id: &UserId,
    ) -> Result<Option<Referral>, DomainError> {
        let referred_uuid = parse_user_id_as_uuid(referred_id)?;

        let row: Option<ReferralRow> = sqlx::query_as(
            r#"
            SELECT id, referrer_id, referred_id, status, reward_points, created_at
            FROM referrals
            WHERE referred_id = $1
            "#,
        )
        .bind(referred_uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read referral", e))?;

        row.map(Referral::try_from).transpose()
    }

    async fn save(&self, referral: &Referral) -> Result<(), DomainError> {
        let referrer_uuid = parse_user_id_as_uuid(&referral.referrer_id)?;
        let referred_uuid = parse_user_id_as_uuid(&referral.referred_id)?;

        sqlx::query(
            r#"
            INSERT INTO referrals (id, referrer_id, referred_id, status, reward_points, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(referral.id.as_uuid())
        .bind(referrer_uuid)
        .bind(referred_uuid)
        .bind(referral.status.as_str())
        .bind(referral.reward_points)
        .bind(referral.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "Failed to save referral",
                &[
                    (
                        "referrals_referred_id_key",
                        ErrorCode::ReferralExists,
                        "User has already been referred",
                    ),
                    (
                        "referrals_no_self_referral",
                        ErrorCode::SelfReferral,
                        "Users cannot refer themselves",
                    ),
                ],
            )
        })?;

        Ok(())
    }

    async fn activate_and_credit(
        &self,
        referral: &Referral,
    ) -> Result<Option<UserRewards>, DomainError> {
        let referrer_uuid = parse_user_id_as_uuid(&referral.referrer_id)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        // Compare-and-set: a concurrent confirm that got here first wins
        let flipped = sqlx::query(
            "UPDATE referrals SET status = $2 WHERE id = $1 AND status = $3",
        )
        .bind(referral.id.as_uuid())
        .bind(ReferralStatus::Active.as_str())
        .bind(ReferralStatus::Pending.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to activate referral", e))?;

        if flipped.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| db_error("Failed to roll back transaction", e))?;
            return Ok(None);
        }

        let row: RewardsRow = sqlx::query_as(
            r#"
            INSERT INTO user_rewards (
                user_id, total_points, current_tier, total_referrals,
                successful_referrals, updated_at
            ) VALUES ($1, $2, $3, 1, 1, now())
            ON CONFLICT (user_id) DO UPDATE SET
                successful_referrals = user_rewards.successful_referrals + 1,
                total_referrals = GREATEST(
                    user_rewards.total_referrals,
                    user_rewards.successful_referrals + 1
                ),
                total_points = user_rewards.total_points + EXCLUDED.total_points,
                updated_at = now()
            RETURNING user_id, total_points, current_tier, total_referrals,
                      successful_referrals, updated_at
            "#,
        )
        .bind(referrer_uuid)
        .bind(referral.reward_points.max(0))
        .bind(DEFAULT_TIER)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to credit referrer", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(Some(row.into()))
    }

    async fn list_history(
        &self,
        referrer_id: &UserId,
    ) -> Result<Vec<ReferralHistoryRecord>, DomainError> {
        let referrer_uuid = parse_user_id_as_uuid(referrer_id)?;

        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT r.id, r.referrer_id, r.referred_id, r.status, r.reward_points, r.created_at,
                   p.name AS referred_name
            FROM referrals r
            LEFT JOIN user_profiles p ON p.id = r.referred_id
            WHERE r.referrer_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(referrer_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list referral history", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(ReferralHistoryRecord {
                    referral: Referral::try_from(row.referral)?,
                    referred_name: row.referred_name,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> ReferralRow {
        ReferralRow {
            id: Uuid::new_v4(),
            referrer_id: Uuid::new_v4(),
            referred_id: Uuid::new_v4(),
            status: status.into(),
            reward_points: 30,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_referral() {
        let referral = Referral::try_from(row("active")).unwrap();
        assert_eq!(referral.status, ReferralStatus::Active);
        assert_eq!(referral.reward_points, 30);
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let err = Referral::try_from(row("lost")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
