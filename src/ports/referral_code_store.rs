//! ReferralCodeStore port.

use async_trait::async_trait;

use crate::domain::{
    foundation::{DomainError, UserId},
    referral::ReferralCode,
};

/// Row returned by the public validation procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicCodeValidation {
    pub is_valid: bool,
    pub referrer_name: Option<String>,
    pub referrer_id: Option<UserId>,
    pub message: Option<String>,
}

/// Store access for referral codes.
///
/// # Contract
///
/// - Codes are compared upper-cased.
/// - `insert_code` fails with `ErrorCode::ReferralCodeExists` when the user
///   already has an active code, and with `ErrorCode::ReferralCodeTaken` when
///   the code belongs to someone else.
#[async_trait]
pub trait ReferralCodeStore: Send + Sync {
    /// The user's active code, if any.
    async fn find_active_code(&self, user_id: &UserId)
        -> Result<Option<ReferralCode>, DomainError>;

    /// Server-side generator. Does not persist the code.
    async fn generate_code(&self, user_name: &str) -> Result<Option<ReferralCode>, DomainError>;

    /// Persists `code` as the user's active code.
    async fn insert_code(&self, user_id: &UserId, code: &ReferralCode) -> Result<(), DomainError>;

    /// Public, read-only validation procedure.
    async fn validate_code_public(
        &self,
        code: &ReferralCode,
    ) -> Result<Vec<PublicCodeValidation>, DomainError>;

    /// True if an active code with this value exists.
    async fn active_code_exists(&self, code: &ReferralCode) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referral_code_store_is_object_safe_and_send_sync() {
        fn _assert_trait_object(_: &dyn ReferralCodeStore) {}
        fn _assert_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_send_sync::<std::sync::Arc<dyn ReferralCodeStore>>();
    }
}
