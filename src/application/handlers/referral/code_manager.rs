//! ReferralCodeManager - get, generate and idempotently initialize a user's
//! referral code.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::referral::{GenerationError, ReferralCode};
use crate::ports::ReferralCodeStore;

/// Manages the single active referral code of each user.
pub struct ReferralCodeManager {
    codes: Arc<dyn ReferralCodeStore>,
    public_base_url: String,
}

impl ReferralCodeManager {
    pub fn new(codes: Arc<dyn ReferralCodeStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            codes,
            public_base_url: public_base_url.into(),
        }
    }

    /// The user's active code. Store errors are logged and read as `None`.
    pub async fn get_user_referral_code(&self, user_id: &UserId) -> Option<ReferralCode> {
        match self.codes.find_active_code(user_id).await {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!(user_id = %user_id, "Failed to load referral code: {}", e);
                None
            }
        }
    }

    /// Generates a new code server-side and binds it to the user.
    pub async fn generate_referral_code(
        &self,
        user_id: &UserId,
        user_name: &str,
    ) -> Result<ReferralCode, GenerationError> {
        let code = self
            .codes
            .generate_code(user_name)
            .await
            .map_err(GenerationError::Generate)?
            .ok_or_else(|| {
                GenerationError::Generate(DomainError::new(
                    ErrorCode::ExternalServiceError,
                    "Code generator returned no code",
                ))
            })?;

        self.codes
            .insert_code(user_id, &code)
            .await
            .map_err(GenerationError::Store)?;

        tracing::info!(user_id = %user_id, code = %code, "Referral code generated");
        Ok(code)
    }

    /// Returns the existing code or creates one.
    ///
    /// Safe to call concurrently: when a parallel call stores a code first,
    /// the stored code is returned. A generated code that already belongs to
    /// another user is regenerated once.
    pub async fn initialize_user_referral_code(
        &self,
        user_id: &UserId,
        user_name: &str,
    ) -> Option<ReferralCode> {
        if let Some(existing) = self.get_user_referral_code(user_id).await {
            return Some(existing);
        }

        let mut generated = self.generate_referral_code(user_id, user_name).await;
        if matches!(&generated, Err(e) if e.is_code_taken()) {
            tracing::debug!(user_id = %user_id, "Generated referral code was taken, retrying");
            generated = self.generate_referral_code(user_id, user_name).await;
        }

        match generated {
            Ok(code) => Some(code),
            Err(e) if e.is_conflict() => {
                tracing::debug!(user_id = %user_id, "Referral code created concurrently, re-reading");
                self.get_user_referral_code(user_id).await
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, "Failed to initialize referral code: {}", e);
                None
            }
        }
    }

    /// Invite link carrying the code, `{base}/join?ref={CODE}`.
    pub fn share_link(&self, code: &ReferralCode) -> String {
        format!(
            "{}/join?ref={}",
            self.public_base_url.trim_end_matches('/'),
            code.as_str()
        )
    }
}
