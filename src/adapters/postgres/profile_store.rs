//! PostgreSQL implementation of ProfileStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{corrupt_row, db_error, map_write_error, parse_user_id_as_uuid, user_id_from_uuid};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::user::{
    DreamFrequency, JournalExperience, NotificationHour, PrivacyLevel, ProfileDraft, UserProfile,
};
use crate::ports::{ProcedureOutcome, ProfileStore};

const PROFILE_COLUMNS: &str = "id, name, email, dream_frequency, journal_experience, goals, \
                               notification_hour, privacy_level, created_at, updated_at";

pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write(&self, draft: &ProfileDraft, on_conflict: &str) -> Result<(), DomainError> {
        let user_uuid = parse_user_id_as_uuid(&draft.user_id)?;
        let sql = format!(
            r#"
            INSERT INTO user_profiles (
                id, name, email, dream_frequency, journal_experience, goals,
                notification_hour, privacy_level, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now())
            {}
            "#,
            on_conflict
        );

        sqlx::query(&sql)
            .bind(user_uuid)
            .bind(&draft.name)
            .bind(&draft.email)
            .bind(draft.dream_frequency.as_str())
            .bind(draft.journal_experience.as_str())
            .bind(&draft.goals)
            .bind(i16::from(draft.notification_hour.value()))
            .bind(draft.privacy_level.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(
                    e,
                    "Failed to write profile",
                    &[(
                        "user_profiles_pkey",
                        ErrorCode::ProfileExists,
                        "Profile already exists for this user",
                    )],
                )
            })?;

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    name: String,
    email: String,
    dream_frequency: String,
    journal_experience: String,
    goals: Vec<String>,
    notification_hour: i16,
    privacy_level: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = DomainError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: user_id_from_uuid(row.id),
            name: row.name,
            email: row.email,
            dream_frequency: DreamFrequency::parse(&row.dream_frequency)
                .map_err(|e| corrupt_row("dream_frequency", e))?,
            journal_experience: JournalExperience::parse(&row.journal_experience)
                .map_err(|e| corrupt_row("journal_experience", e))?,
            goals: row.goals,
            notification_hour: NotificationHour::try_new(i32::from(row.notification_hour))
                .map_err(|e| corrupt_row("notification_hour", e))?,
            privacy_level: PrivacyLevel::parse(&row.privacy_level)
                .map_err(|e| corrupt_row("privacy_level", e))?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn create_profile_atomic(
        &self,
        draft: &ProfileDraft,
    ) -> Result<ProcedureOutcome, DomainError> {
        let payload = serde_json::to_value(draft)
            .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?;

        let result: serde_json::Value = sqlx::query_scalar("SELECT create_user_profile_json($1)")
            .bind(payload)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("create_user_profile_json failed", e))?;

        serde_json::from_value(result).map_err(|e| corrupt_row("procedure result", e))
    }

    async fn get_or_create_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserProfile>, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;
        let sql = format!(
            "SELECT {} FROM get_or_create_user_profile($1)",
            PROFILE_COLUMNS
        );

        let rows: Vec<ProfileRow> = sqlx::query_as(&sql)
            .bind(user_uuid)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("get_or_create_user_profile failed", e))?;

        rows.into_iter().map(UserProfile::try_from).collect()
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;
        let sql = format!("SELECT {} FROM user_profiles WHERE id = $1", PROFILE_COLUMNS);

        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(user_uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to read profile", e))?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn insert_profile(&self, draft: &ProfileDraft) -> Result<(), DomainError> {
        self.write(draft, "").await
    }

    async fn upsert_profile(&self, draft: &ProfileDraft) -> Result<(), DomainError> {
        self.write(
            draft,
            r#"ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                dream_frequency = EXCLUDED.dream_frequency,
                journal_experience = EXCLUDED.journal_experience,
                goals = EXCLUDED.goals,
                notification_hour = EXCLUDED.notification_hour,
                privacy_level = EXCLUDED.privacy_level,
                updated_at = now()"#,
        )
        .await
    }
}
