//! PostgreSQL adapters - Database implementations for the store ports.
//!
//! - `PostgresProfileStore` - Profiles via the atomic procedures and direct writes
//! - `PostgresReferralCodeStore` - Referral codes and public validation
//! - `PostgresReferralRepository` - Referral edges and history
//! - `PostgresRewardsStore` - Rewards ledger and tier catalog
//!
//! Schema and server-side functions live in `migrations/`.

mod profile_store;
mod referral_code_store;
mod referral_repository;
mod rewards_store;

pub use profile_store::PostgresProfileStore;
pub use referral_code_store::PostgresReferralCodeStore;
pub use referral_repository::PostgresReferralRepository;
pub use rewards_store::PostgresRewardsStore;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Opens a connection pool sized by `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await
}

/// Applies the bundled migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

fn parse_user_id_as_uuid(user_id: &UserId) -> Result<Uuid, DomainError> {
    Uuid::parse_str(user_id.as_str()).map_err(|e| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("User ID must be a valid UUID: {}", e),
        )
    })
}

fn user_id_from_uuid(uuid: Uuid) -> UserId {
    UserId::from_uuid(uuid)
}

/// Maps a named constraint violation to its conflict code, anything else to
/// `DatabaseError` with `context`.
fn map_write_error(
    e: sqlx::Error,
    context: &str,
    constraints: &[(&str, ErrorCode, &str)],
) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if let Some(name) = db_err.constraint() {
            if let Some((_, code, message)) = constraints.iter().find(|(c, _, _)| *c == name) {
                return DomainError::new(*code, *message);
            }
        }
    }
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn corrupt_row(field: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", field, e),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_must_be_uuid() {
        let err = parse_user_id_as_uuid(&UserId::new("not-a-uuid").unwrap()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn uuid_round_trips_through_user_id() {
        let uuid = Uuid::new_v4();
        let id = user_id_from_uuid(uuid);
        assert_eq!(parse_user_id_as_uuid(&id).unwrap(), uuid);
    }

    #[test]
    fn non_database_errors_map_to_database_error() {
        let err = map_write_error(
            sqlx::Error::RowNotFound,
            "Failed to save",
            &[("any_key", ErrorCode::ReferralExists, "dup")],
        );
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.starts_with("Failed to save"));
    }
}
