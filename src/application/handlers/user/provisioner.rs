//! ProfileProvisioner - makes sure a signed-in identity has a profile.
//!
//! Escalates through three store paths, strictly in order:
//!
//! 1. the atomic ensure-and-fetch procedure (first row wins);
//! 2. a direct read by identity;
//! 3. insert of the minimal default profile, then a re-read.
//!
//! A unique violation on step 3 means a concurrent step 1 won; the
//! provisioner re-reads instead of failing.

use std::sync::Arc;

use serde::Serialize;

use crate::application::StepOutcome;
use crate::domain::foundation::UserId;
use crate::domain::referral::UserRewards;
use crate::domain::user::{ProfileDraft, UserProfile};
use crate::ports::{ProfileStore, RewardsStore};

/// Which path produced the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileProvisioning {
    /// Returned by the atomic ensure-and-fetch procedure.
    Ensured(UserProfile),
    /// Found by the direct read.
    Found(UserProfile),
    /// Inserted with minimal defaults (or by a concurrent writer) and re-read.
    Created(UserProfile),
    /// No profile could be produced.
    Unavailable { reason: String },
}

impl ProfileProvisioning {
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            ProfileProvisioning::Ensured(p)
            | ProfileProvisioning::Found(p)
            | ProfileProvisioning::Created(p) => Some(p),
            ProfileProvisioning::Unavailable { .. } => None,
        }
    }

    pub fn into_profile(self) -> Option<UserProfile> {
        match self {
            ProfileProvisioning::Ensured(p)
            | ProfileProvisioning::Found(p)
            | ProfileProvisioning::Created(p) => Some(p),
            ProfileProvisioning::Unavailable { .. } => None,
        }
    }

    /// The profile, or in-memory minimal defaults when unavailable.
    pub fn profile_or_defaults(self, user_id: &UserId) -> UserProfile {
        self.into_profile()
            .unwrap_or_else(|| UserProfile::defaults_for(user_id.clone()))
    }
}

/// Outcome of the direct-write fallback used at signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackReport {
    pub profile: StepOutcome,
    pub rewards: StepOutcome,
}

pub struct ProfileProvisioner {
    profiles: Arc<dyn ProfileStore>,
    rewards: Arc<dyn RewardsStore>,
}

impl ProfileProvisioner {
    pub fn new(profiles: Arc<dyn ProfileStore>, rewards: Arc<dyn RewardsStore>) -> Self {
        Self { profiles, rewards }
    }

    pub async fn ensure_profile(&self, user_id: &UserId) -> ProfileProvisioning {
        // 1. Atomic ensure-and-fetch
        match self.profiles.get_or_create_profile(user_id).await {
            Ok(rows) => {
                if let Some(profile) = rows.into_iter().next() {
                    return ProfileProvisioning::Ensured(profile);
                }
                tracing::debug!(user_id = %user_id, "Ensure procedure returned no rows");
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, "Ensure profile procedure failed: {}", e);
            }
        }

        // 2. Direct read
        match self.profiles.find_profile(user_id).await {
            Ok(Some(profile)) => return ProfileProvisioning::Found(profile),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(user_id = %user_id, "Failed to fetch profile directly: {}", e);
                return ProfileProvisioning::Unavailable {
                    reason: e.to_string(),
                };
            }
        }

        // 3. Minimal insert, then re-read
        if let Err(e) = self
            .profiles
            .insert_profile(&ProfileDraft::minimal(user_id.clone()))
            .await
        {
            if !e.is_conflict() {
                tracing::error!(user_id = %user_id, "Failed to create minimal profile: {}", e);
                return ProfileProvisioning::Unavailable {
                    reason: e.to_string(),
                };
            }
            tracing::debug!(user_id = %user_id, "Profile created concurrently, re-reading");
        }

        match self.profiles.find_profile(user_id).await {
            Ok(Some(profile)) => ProfileProvisioning::Created(profile),
            Ok(None) => {
                tracing::error!(user_id = %user_id, "Profile missing after insert");
                ProfileProvisioning::Unavailable {
                    reason: "profile missing after insert".to_string(),
                }
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, "Failed to re-read created profile: {}", e);
                ProfileProvisioning::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Direct-write path: upsert the profile, then create the rewards ledger
    /// if it does not exist yet. Each half is reported separately.
    pub async fn create_profile_fallback(&self, draft: &ProfileDraft) -> FallbackReport {
        tracing::info!(user_id = %draft.user_id, "Attempting fallback profile creation");

        let profile = match self.profiles.upsert_profile(draft).await {
            Ok(()) => StepOutcome::Completed,
            Err(e) => {
                tracing::error!(user_id = %draft.user_id, "Fallback profile creation failed: {}", e);
                StepOutcome::failed(e)
            }
        };

        let rewards = match self
            .rewards
            .initialize_rewards(&UserRewards::new(draft.user_id.clone()))
            .await
        {
            Ok(true) => StepOutcome::Completed,
            Ok(false) => StepOutcome::Unchanged,
            Err(e) => {
                tracing::error!(
                    user_id = %draft.user_id,
                    "Fallback rewards initialization failed: {}",
                    e
                );
                StepOutcome::failed(e)
            }
        };

        FallbackReport { profile, rewards }
    }
}
