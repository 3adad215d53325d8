//! ProfileStore port for user profile persistence.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    foundation::{DomainError, UserId},
    user::{ProfileDraft, UserProfile},
};

/// Result row of the atomic profile creation procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl ProcedureOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Store access for user profiles.
///
/// # Contract
///
/// - `insert_profile` fails with `ErrorCode::ProfileExists` when a profile
///   already exists for the identity.
/// - `upsert_profile` is keyed by identity and never creates a second row.
/// - Transient failures surface as `ErrorCode::DatabaseError`.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Server-side atomic creation from signup data.
    async fn create_profile_atomic(
        &self,
        draft: &ProfileDraft,
    ) -> Result<ProcedureOutcome, DomainError>;

    /// Server-side ensure-and-fetch. Returns zero or more rows; callers use
    /// the first.
    async fn get_or_create_profile(&self, user_id: &UserId)
        -> Result<Vec<UserProfile>, DomainError>;

    /// Direct read by identity.
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError>;

    /// Plain insert; conflicts on an existing identity.
    async fn insert_profile(&self, draft: &ProfileDraft) -> Result<(), DomainError>;

    /// Insert or overwrite keyed by identity.
    async fn upsert_profile(&self, draft: &ProfileDraft) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_store_is_object_safe_and_send_sync() {
        fn _assert_trait_object(_: &dyn ProfileStore) {}
        fn _assert_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_send_sync::<std::sync::Arc<dyn ProfileStore>>();
    }

    #[test]
    fn outcome_constructors() {
        assert!(ProcedureOutcome::succeeded().success);
        let failed = ProcedureOutcome::failed("permission denied");
        assert!(!failed.success);
        assert_eq!(failed.message.as_deref(), Some("permission denied"));
    }
}
