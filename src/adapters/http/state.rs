//! Shared application state for the HTTP surface.

use std::sync::Arc;

use crate::adapters::memory::InMemoryStore;
use crate::application::{
    ConfirmReferralHandler, CurrentUserHandler, GetReferralDataHandler, ProfileProvisioner,
    ReferralCodeManager, ReferralValidator, RetryPolicy, SignInHandler, SignOutHandler,
    SignUpHandler,
};
use crate::config::{ProvisioningConfig, ReferralConfig};
use crate::domain::referral::{POINTS_PER_REFERRAL, WELCOME_BONUS_POINTS};
use crate::ports::{AuthProvider, ProfileStore, ReferralCodeStore, ReferralRepository, RewardsStore};

/// Program rules handed to the handlers.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub points_per_referral: i64,
    pub welcome_bonus: i64,
    pub public_base_url: String,
    pub retry: RetryPolicy,
}

impl AppSettings {
    pub fn from_config(referral: &ReferralConfig, provisioning: &ProvisioningConfig) -> Self {
        Self {
            points_per_referral: referral.points_per_referral,
            welcome_bonus: referral.welcome_bonus,
            public_base_url: referral.public_base_url.clone(),
            retry: provisioning.retry_policy(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            points_per_referral: POINTS_PER_REFERRAL,
            welcome_bonus: WELCOME_BONUS_POINTS,
            public_base_url: "http://localhost:5173".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub codes: Arc<dyn ReferralCodeStore>,
    pub referrals: Arc<dyn ReferralRepository>,
    pub rewards: Arc<dyn RewardsStore>,
    pub settings: Arc<AppSettings>,
}

impl AppState {
    /// State backed entirely by one in-memory store.
    pub fn in_memory(
        store: Arc<InMemoryStore>,
        auth: Arc<dyn AuthProvider>,
        settings: AppSettings,
    ) -> Self {
        Self {
            auth,
            profiles: store.clone(),
            codes: store.clone(),
            referrals: store.clone(),
            rewards: store,
            settings: Arc::new(settings),
        }
    }

    pub fn sign_up_handler(&self) -> SignUpHandler {
        SignUpHandler::new(
            self.auth.clone(),
            self.profiles.clone(),
            self.codes.clone(),
            self.referrals.clone(),
            self.rewards.clone(),
        )
        .with_retry_policy(self.settings.retry.clone())
        .with_welcome_bonus(self.settings.welcome_bonus)
        .with_points_per_referral(self.settings.points_per_referral)
    }

    pub fn sign_in_handler(&self) -> SignInHandler {
        SignInHandler::new(self.auth.clone())
    }

    pub fn sign_out_handler(&self) -> SignOutHandler {
        SignOutHandler::new(self.auth.clone())
    }

    pub fn current_user_handler(&self) -> CurrentUserHandler {
        CurrentUserHandler::new(self.auth.clone())
    }

    pub fn provisioner(&self) -> ProfileProvisioner {
        ProfileProvisioner::new(self.profiles.clone(), self.rewards.clone())
    }

    pub fn code_manager(&self) -> ReferralCodeManager {
        ReferralCodeManager::new(self.codes.clone(), self.settings.public_base_url.clone())
    }

    pub fn validator(&self) -> ReferralValidator {
        ReferralValidator::new(self.codes.clone())
    }

    pub fn referral_data_handler(&self) -> GetReferralDataHandler {
        GetReferralDataHandler::new(self.rewards.clone(), self.referrals.clone())
            .with_points_per_referral(self.settings.points_per_referral)
    }

    pub fn confirm_referral_handler(&self) -> ConfirmReferralHandler {
        ConfirmReferralHandler::new(self.referrals.clone(), self.rewards.clone())
    }
}
