//! Referral edge between a referrer and the user they invited.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ReferralError;
use super::tier::POINTS_PER_REFERRAL;
use crate::domain::foundation::{ReferralId, StateMachine, Timestamp, UserId, ValidationError};

/// Lifecycle of a referral.
///
/// `Pending` on signup; `Active` once the referred user is confirmed.
/// `Active`, `Rejected` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    #[default]
    Pending,
    Active,
    Rejected,
    Expired,
}

impl ReferralStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Active => "active",
            ReferralStatus::Rejected => "rejected",
            ReferralStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReferralStatus::Pending),
            "active" => Ok(ReferralStatus::Active),
            "rejected" => Ok(ReferralStatus::Rejected),
            "expired" => Ok(ReferralStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "referral_status",
                format!("unknown status '{}'", other),
            )),
        }
    }

    /// Counts toward the referrer's successful referrals.
    pub fn is_successful(&self) -> bool {
        matches!(self, ReferralStatus::Active)
    }
}

impl StateMachine for ReferralStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ReferralStatus::*;
        matches!(
            (self, target),
            (Pending, Active) | (Pending, Rejected) | (Pending, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ReferralStatus::*;
        match self {
            Pending => vec![Active, Rejected, Expired],
            Active | Rejected | Expired => vec![],
        }
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A referrer → referred edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub id: ReferralId,
    pub referrer_id: UserId,
    pub referred_id: UserId,
    pub status: ReferralStatus,
    pub reward_points: i64,
    pub created_at: Timestamp,
}

impl Referral {
    /// A freshly attributed referral awaiting confirmation.
    ///
    /// # Errors
    ///
    /// `SelfReferral` when both ends are the same user.
    pub fn pending(referrer_id: UserId, referred_id: UserId) -> Result<Self, ReferralError> {
        Self::pending_with_points(referrer_id, referred_id, POINTS_PER_REFERRAL)
    }

    pub fn pending_with_points(
        referrer_id: UserId,
        referred_id: UserId,
        reward_points: i64,
    ) -> Result<Self, ReferralError> {
        if referrer_id == referred_id {
            return Err(ReferralError::SelfReferral);
        }
        Ok(Self {
            id: ReferralId::new(),
            referrer_id,
            referred_id,
            status: ReferralStatus::Pending,
            reward_points,
            created_at: Timestamp::now(),
        })
    }

    /// Moves to `Active`.
    pub fn activate(&mut self) -> Result<(), ReferralError> {
        self.move_to(ReferralStatus::Active)
    }

    pub fn reject(&mut self) -> Result<(), ReferralError> {
        self.move_to(ReferralStatus::Rejected)
    }

    pub fn expire(&mut self) -> Result<(), ReferralError> {
        self.move_to(ReferralStatus::Expired)
    }

    fn move_to(&mut self, target: ReferralStatus) -> Result<(), ReferralError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| ReferralError::InvalidTransition {
                from: self.status,
                to: target,
            })?;
        Ok(())
    }
}

/// A referral joined with the referred user's display name, for history views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralHistoryRecord {
    pub referral: Referral,
    pub referred_name: Option<String>,
}
