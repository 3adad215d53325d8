//! Referral domain module.
//!
//! Referral codes, the referrer → referred lifecycle, the per-user reward
//! ledger and the tier ladder.
//!
//! # Invariants
//!
//! - A user has zero or one active code.
//! - A referred user is the target of at most one referral.
//! - `successful_referrals <= total_referrals` on every ledger.
//! - Tier rank never decreases as successful referrals grow.

mod code;
mod errors;
#[allow(clippy::module_inception)]
mod referral;
mod rewards;
mod summary;
mod tier;
mod validation;

pub use code::{random_suffix, ReferralCode, CODE_PREFIX, NAME_PART_LEN, SUFFIX_LEN};
pub use errors::{GenerationError, ReferralError};
pub use referral::{Referral, ReferralHistoryRecord, ReferralStatus};
pub use rewards::{UserRewards, WELCOME_BONUS_POINTS};
pub use summary::{ReferralData, ReferralDataSlice, ReferralHistoryEntry, ANONYMOUS_USER};
pub use tier::{
    RewardTier, TierCatalog, TierProgress, DEFAULT_NEXT_TIER, DEFAULT_NEXT_TIER_THRESHOLD,
    DEFAULT_TIER, MAX_TIER_REACHED, POINTS_PER_REFERRAL,
};
pub use validation::{
    ReferralValidationResult, MSG_EMPTY_CODE, MSG_INVALID_FORMAT, MSG_VALIDATION_UNAVAILABLE,
    MSG_VALID_CODE,
};
