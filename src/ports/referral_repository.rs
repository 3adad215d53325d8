//! ReferralRepository port for referral edges.

use async_trait::async_trait;

use crate::domain::{
    foundation::{DomainError, UserId},
    referral::{Referral, ReferralHistoryRecord, UserRewards},
};

#[async_trait]
pub trait ReferralRepository: Send + Sync {
    /// The referral whose target is `referred_id`, if any.
    async fn find_by_referred(&self, referred_id: &UserId)
        -> Result<Option<Referral>, DomainError>;

    /// Inserts a new referral.
    ///
    /// Fails with `ErrorCode::ReferralExists` when the referred user already
    /// has one.
    async fn save(&self, referral: &Referral) -> Result<(), DomainError>;

    /// Moves `referral` from pending to active and credits its points to the
    /// referrer's ledger as one unit of work.
    ///
    /// Returns the referrer's updated ledger, or `None` when the referral was
    /// no longer pending and nothing was written. A failure leaves both the
    /// referral and the ledger unchanged.
    async fn activate_and_credit(
        &self,
        referral: &Referral,
    ) -> Result<Option<UserRewards>, DomainError>;

    /// Referrals made by `referrer_id`, newest first, joined with the
    /// referred user's profile name.
    async fn list_history(
        &self,
        referrer_id: &UserId,
    ) -> Result<Vec<ReferralHistoryRecord>, DomainError>;
}
