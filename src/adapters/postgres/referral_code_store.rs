//! PostgreSQL implementation of ReferralCodeStore.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, map_write_error, parse_user_id_as_uuid, user_id_from_uuid};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::referral::ReferralCode;
use crate::ports::{PublicCodeValidation, ReferralCodeStore};

pub struct PostgresReferralCodeStore {
    pool: PgPool,
}

impl PostgresReferralCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ValidationRow {
    is_valid: Option<bool>,
    referrer_name: Option<String>,
    referrer_id: Option<Uuid>,
    message: Option<String>,
}

impl From<ValidationRow> for PublicCodeValidation {
    fn from(row: ValidationRow) -> Self {
        let is_valid = row.is_valid.unwrap_or(false);
        PublicCodeValidation {
            is_valid,
            referrer_name: row.referrer_name,
            referrer_id: row.referrer_id.filter(|_| is_valid).map(user_id_from_uuid),
            message: row.message,
        }
    }
}

#[async_trait]
impl ReferralCodeStore for PostgresReferralCodeStore {
    async fn find_active_code(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ReferralCode>, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let code: Option<String> = sqlx::query_scalar(
            r#"
            SELECT code FROM referral_codes
            WHERE user_id = $1 AND is_active
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read referral code", e))?;

        Ok(code.map(ReferralCode::from_stored))
    }

    async fn generate_code(&self, user_name: &str) -> Result<Option<ReferralCode>, DomainError> {
        let code: Option<String> = sqlx::query_scalar("SELECT generate_referral_code($1)")
            .bind(user_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("generate_referral_code failed", e))?;

        Ok(code
            .filter(|c| !c.trim().is_empty())
            .map(ReferralCode::from_stored))
    }

    async fn insert_code(&self, user_id: &UserId, code: &ReferralCode) -> Result<(), DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        sqlx::query("INSERT INTO referral_codes (user_id, code, is_active) VALUES ($1, $2, TRUE)")
            .bind(user_uuid)
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(
                    e,
                    "Failed to save referral code",
                    &[
                        (
                            "referral_codes_one_active_per_user",
                            ErrorCode::ReferralCodeExists,
                            "User already has an active referral code",
                        ),
                        (
                            "referral_codes_code_key",
                            ErrorCode::ReferralCodeTaken,
                            "Referral code already in use",
                        ),
                    ],
                )
            })?;

        Ok(())
    }

    async fn validate_code_public(
        &self,
        code: &ReferralCode,
    ) -> Result<Vec<PublicCodeValidation>, DomainError> {
        let rows: Vec<ValidationRow> = sqlx::query_as(
            "SELECT is_valid, referrer_name, referrer_id, message \
             FROM validate_referral_code_public($1)",
        )
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("validate_referral_code_public failed", e))?;

        Ok(rows.into_iter().map(PublicCodeValidation::from).collect())
    }

    async fn active_code_exists(&self, code: &ReferralCode) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM referral_codes WHERE code = $1 AND is_active)",
        )
        .bind(code.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check referral code", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_row_never_carries_referrer_id() {
        let row = ValidationRow {
            is_valid: Some(false),
            referrer_name: None,
            referrer_id: Some(Uuid::new_v4()),
            message: Some("Referral code not found or inactive".into()),
        };
        let validation = PublicCodeValidation::from(row);
        assert!(!validation.is_valid);
        assert!(validation.referrer_id.is_none());
    }

    #[test]
    fn null_validity_is_invalid() {
        let row = ValidationRow {
            is_valid: None,
            referrer_name: None,
            referrer_id: None,
            message: None,
        };
        assert!(!PublicCodeValidation::from(row).is_valid);
    }

    #[test]
    fn valid_row_maps_referrer() {
        let owner = Uuid::new_v4();
        let row = ValidationRow {
            is_valid: Some(true),
            referrer_name: Some("Olive".into()),
            referrer_id: Some(owner),
            message: Some("Valid referral code".into()),
        };
        let validation = PublicCodeValidation::from(row);
        assert_eq!(validation.referrer_id, Some(UserId::from_uuid(owner)));
        assert_eq!(validation.referrer_name.as_deref(), Some("Olive"));
    }
}
