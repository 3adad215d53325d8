//! Referral domain errors.

use thiserror::Error;

use super::referral::ReferralStatus;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors raised by referral entities and handlers.
#[derive(Debug, Clone, Error)]
pub enum ReferralError {
    #[error("A user cannot refer themselves")]
    SelfReferral,

    #[error("User has already been referred")]
    AlreadyReferred,

    #[error("No referral found for this user")]
    NotFound,

    #[error("Referral cannot move from {from} to {to}")]
    InvalidTransition {
        from: ReferralStatus,
        to: ReferralStatus,
    },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] DomainError),
}

impl From<ReferralError> for DomainError {
    fn from(err: ReferralError) -> Self {
        let message = err.to_string();
        match err {
            ReferralError::SelfReferral => DomainError::new(ErrorCode::SelfReferral, message),
            ReferralError::AlreadyReferred => DomainError::new(ErrorCode::ReferralExists, message),
            ReferralError::NotFound => DomainError::new(ErrorCode::ReferralNotFound, message),
            ReferralError::InvalidTransition { .. } => {
                DomainError::new(ErrorCode::InvalidStateTransition, message)
            }
            ReferralError::Validation(v) => v.into(),
            ReferralError::Store(e) => e,
        }
    }
}

/// Failure while creating a new referral code.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The server-side generator failed or returned nothing.
    #[error("Failed to generate referral code: {0}")]
    Generate(DomainError),

    /// The generated code could not be stored for the user.
    #[error("Failed to store referral code: {0}")]
    Store(DomainError),
}

impl GenerationError {
    /// True when the store refused the row because the user already has an
    /// active code.
    pub fn is_conflict(&self) -> bool {
        matches!(self, GenerationError::Store(e) if e.code == ErrorCode::ReferralCodeExists)
    }

    /// True when the generated code already belongs to someone else.
    pub fn is_code_taken(&self) -> bool {
        matches!(self, GenerationError::Store(e) if e.code == ErrorCode::ReferralCodeTaken)
    }
}
