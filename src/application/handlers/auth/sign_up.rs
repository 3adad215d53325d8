//! SignUpHandler - Command handler for account creation.
//!
//! Sequence:
//!
//! 1. A supplied referral code is validated; an invalid code aborts before
//!    any identity exists.
//! 2. The auth identity is created with name, code and referrer as metadata.
//! 3. The profile is created through the atomic procedure with bounded
//!    retry and backoff, then the direct-write fallback. Never fatal.
//! 4. With a valid code: welcome bonus and referral attribution, both
//!    best-effort and reported.

use std::sync::Arc;

use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;

use crate::application::handlers::referral::{
    RecordReferralCommand, RecordReferralHandler, ReferralValidator,
};
use crate::application::handlers::user::{FallbackReport, ProfileProvisioner};
use crate::application::{RetryPolicy, StepOutcome};
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::domain::referral::{ReferralCode, UserRewards, WELCOME_BONUS_POINTS};
use crate::domain::user::{
    DreamFrequency, JournalExperience, NotificationHour, PrivacyLevel, ProfileDraft, DEFAULT_GOAL,
};
use crate::ports::{
    AuthProvider, ProfileStore, ReferralCodeStore, ReferralRepository, RewardsStore,
    SignUpMetadata, SignUpRequest,
};

/// Onboarding answers stored on the new profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePreferences {
    pub dream_frequency: DreamFrequency,
    pub journal_experience: JournalExperience,
    pub goals: Vec<String>,
    pub notification_hour: NotificationHour,
    pub privacy_level: PrivacyLevel,
}

impl Default for ProfilePreferences {
    fn default() -> Self {
        Self {
            dream_frequency: DreamFrequency::default(),
            journal_experience: JournalExperience::default(),
            goals: vec![DEFAULT_GOAL.to_string()],
            notification_hour: NotificationHour::default(),
            privacy_level: PrivacyLevel::default(),
        }
    }
}

/// Command to create an account.
#[derive(Debug, Clone)]
pub struct SignUpCommand {
    pub email: String,
    pub password: SecretString,
    pub name: String,
    /// `None` or `""` means no code was supplied. Anything else, including
    /// whitespace, is validated.
    pub referral_code: Option<String>,
    pub preferences: ProfilePreferences,
}

/// Fatal signup errors. Everything after identity creation is reported in
/// [`SignUpResult`] instead.
#[derive(Debug, Clone, Error)]
pub enum SignUpError {
    #[error("Invalid referral code: {message}")]
    InvalidReferralCode { message: String },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// How the profile came to exist (or not).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum ProfileCreation {
    /// The atomic procedure succeeded on attempt `attempts`.
    Atomic { attempts: u32 },
    /// The atomic procedure gave up after `attempts`; the direct-write
    /// fallback ran.
    Fallback {
        attempts: u32,
        last_error: String,
        report: FallbackReport,
    },
}

/// Result of a successful signup.
#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub user: AuthenticatedUser,
    pub profile: ProfileCreation,
    pub referrer_id: Option<UserId>,
    pub welcome_bonus: StepOutcome,
    pub attribution: StepOutcome,
}

pub struct SignUpHandler {
    auth: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileStore>,
    rewards: Arc<dyn RewardsStore>,
    validator: ReferralValidator,
    provisioner: ProfileProvisioner,
    recorder: RecordReferralHandler,
    retry: RetryPolicy,
    welcome_bonus_points: i64,
}

impl SignUpHandler {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
        codes: Arc<dyn ReferralCodeStore>,
        referrals: Arc<dyn ReferralRepository>,
        rewards: Arc<dyn RewardsStore>,
    ) -> Self {
        Self {
            validator: ReferralValidator::new(codes),
            provisioner: ProfileProvisioner::new(profiles.clone(), rewards.clone()),
            recorder: RecordReferralHandler::new(referrals, rewards.clone()),
            auth,
            profiles,
            rewards,
            retry: RetryPolicy::default(),
            welcome_bonus_points: WELCOME_BONUS_POINTS,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_welcome_bonus(mut self, points: i64) -> Self {
        self.welcome_bonus_points = points;
        self
    }

    pub fn with_points_per_referral(mut self, points: i64) -> Self {
        self.recorder = self.recorder.with_points_per_referral(points);
        self
    }

    pub async fn handle(&self, cmd: SignUpCommand) -> Result<SignUpResult, SignUpError> {
        // 1. Validate a supplied referral code
        let supplied_code = cmd.referral_code.as_deref().filter(|c| !c.is_empty());
        let referral = match supplied_code {
            Some(raw) => {
                let validation = self.validator.validate_referral_code(raw).await;
                if !validation.is_valid {
                    tracing::info!("Signup rejected: invalid referral code");
                    return Err(SignUpError::InvalidReferralCode {
                        message: validation.message,
                    });
                }
                Some((ReferralCode::from_stored(raw.trim()), validation.referrer_id))
            }
            None => None,
        };
        let referrer_id = referral.as_ref().and_then(|(_, id)| id.clone());

        // 2. Create the identity
        let user = self
            .auth
            .sign_up(SignUpRequest {
                email: cmd.email.clone(),
                password: cmd.password,
                metadata: SignUpMetadata {
                    name: cmd.name.clone(),
                    referral_code: referral.as_ref().map(|(code, _)| code.to_string()),
                    referrer_id: referrer_id.clone(),
                },
            })
            .await
            .map_err(|e| {
                tracing::error!("Signup identity creation failed: {}", e);
                SignUpError::Auth(e)
            })?;

        // 3. Profile
        let draft = ProfileDraft {
            user_id: user.id.clone(),
            name: cmd.name,
            email: cmd.email,
            dream_frequency: cmd.preferences.dream_frequency,
            journal_experience: cmd.preferences.journal_experience,
            goals: cmd.preferences.goals,
            notification_hour: cmd.preferences.notification_hour,
            privacy_level: cmd.preferences.privacy_level,
        };
        let profile = self.create_profile(&draft).await;

        // 4. Referral rewards
        let (welcome_bonus, attribution) = match &referral {
            Some(_) => (
                self.grant_welcome_bonus(&user.id).await,
                self.attribute(&user.id, referrer_id.as_ref()).await,
            ),
            None => (StepOutcome::Skipped, StepOutcome::Skipped),
        };

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(SignUpResult {
            user,
            profile,
            referrer_id,
            welcome_bonus,
            attribution,
        })
    }

    async fn create_profile(&self, draft: &ProfileDraft) -> ProfileCreation {
        let mut attempts = 0;
        let mut last_error = String::new();

        while attempts < self.retry.max_attempts {
            if attempts > 0 {
                self.retry.wait(attempts).await;
            }
            attempts += 1;

            match self.profiles.create_profile_atomic(draft).await {
                Ok(outcome) if outcome.success => {
                    return ProfileCreation::Atomic { attempts };
                }
                Ok(outcome) => {
                    last_error = outcome
                        .message
                        .unwrap_or_else(|| "profile procedure reported failure".to_string());
                    tracing::error!(
                        user_id = %draft.user_id,
                        "Profile creation procedure failed: {}",
                        last_error
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        user_id = %draft.user_id,
                        attempt = attempts,
                        "Profile creation procedure error: {}",
                        e
                    );
                    last_error = e.to_string();
                }
            }
        }

        let report = self.provisioner.create_profile_fallback(draft).await;
        ProfileCreation::Fallback {
            attempts,
            last_error,
            report,
        }
    }

    async fn grant_welcome_bonus(&self, user_id: &UserId) -> StepOutcome {
        let rewards = UserRewards::with_welcome_bonus(user_id.clone(), self.welcome_bonus_points);
        match self.rewards.upsert_rewards(&rewards).await {
            Ok(()) => StepOutcome::Completed,
            Err(e) => {
                tracing::error!(user_id = %user_id, "Failed to add referral bonus: {}", e);
                StepOutcome::failed(e)
            }
        }
    }

    async fn attribute(&self, user_id: &UserId, referrer_id: Option<&UserId>) -> StepOutcome {
        let Some(referrer_id) = referrer_id else {
            return StepOutcome::Skipped;
        };
        let cmd = RecordReferralCommand {
            referrer_id: referrer_id.clone(),
            referred_id: user_id.clone(),
        };
        match self.recorder.handle(cmd).await {
            Ok(_) => StepOutcome::Completed,
            Err(e) => {
                tracing::error!(user_id = %user_id, "Failed to record referral: {}", e);
                StepOutcome::failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockAuthProvider;
    use crate::adapters::memory::{InMemoryStore, StoreOp};

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        auth: Arc<MockAuthProvider>,
        handler: SignUpHandler,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::with_default_tiers());
        let auth = Arc::new(MockAuthProvider::new());
        let handler = SignUpHandler::new(
            auth.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        )
        .with_retry_policy(RetryPolicy::immediate(3));
        Fixture {
            store,
            auth,
            handler,
        }
    }

    fn seed_referrer(store: &InMemoryStore) -> (UserId, ReferralCode) {
        let referrer = uid("referrer");
        let mut draft = ProfileDraft::minimal(referrer.clone());
        draft.name = "John".into();
        store.seed_profile(draft);
        let code = ReferralCode::parse("DREAMJOH8X2K4").unwrap();
        store.seed_code(referrer.clone(), code.clone());
        (referrer, code)
    }

    fn command(code: Option<&str>) -> SignUpCommand {
        SignUpCommand {
            email: "new@example.com".into(),
            password: SecretString::new("correct horse".into()),
            name: "Nina".into(),
            referral_code: code.map(String::from),
            preferences: ProfilePreferences::default(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Referral code gate
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invalid_code_aborts_before_identity_creation() {
        let f = fixture();
        let err = f.handler.handle(command(Some("BOGUS"))).await.unwrap_err();

        assert!(matches!(err, SignUpError::InvalidReferralCode { .. }));
        assert_eq!(f.auth.signup_count(), 0);
        assert_eq!(f.store.profile_count(), 0);
    }

    #[tokio::test]
    async fn whitespace_code_is_validated_and_rejected() {
        let f = fixture();
        let err = f.handler.handle(command(Some("   "))).await.unwrap_err();

        match err {
            SignUpError::InvalidReferralCode { message } => {
                assert_eq!(message, "Please enter a referral code")
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(f.auth.signup_count(), 0);
    }

    #[tokio::test]
    async fn empty_code_counts_as_not_supplied() {
        let f = fixture();
        let result = f.handler.handle(command(Some(""))).await.unwrap();

        assert_eq!(result.welcome_bonus, StepOutcome::Skipped);
        assert_eq!(f.store.calls(StoreOp::ValidateCodePublic), 0);
    }

    #[tokio::test]
    async fn validation_outage_blocks_signup_with_code() {
        let f = fixture();
        seed_referrer(&f.store);
        f.store.fail(StoreOp::ValidateCodePublic);

        let err = f
            .handler
            .handle(command(Some("DREAMJOH8X2K4")))
            .await
            .unwrap_err();
        assert!(matches!(err, SignUpError::InvalidReferralCode { .. }));
        assert_eq!(f.auth.signup_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Identity creation
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn auth_failure_is_fatal() {
        let f = fixture();
        f.auth.set_error(Some(AuthError::UserAlreadyExists));

        let err = f.handler.handle(command(None)).await.unwrap_err();
        assert!(matches!(err, SignUpError::Auth(AuthError::UserAlreadyExists)));
        assert_eq!(f.store.calls(StoreOp::CreateProfileAtomic), 0);
    }

    #[tokio::test]
    async fn metadata_carries_code_and_referrer() {
        let f = fixture();
        let (referrer, _) = seed_referrer(&f.store);

        f.handler
            .handle(command(Some(" dreamjoh8x2k4")))
            .await
            .unwrap();

        let meta = f.auth.last_metadata().unwrap();
        assert_eq!(meta.name, "Nina");
        assert_eq!(meta.referral_code.as_deref(), Some("DREAMJOH8X2K4"));
        assert_eq!(meta.referrer_id, Some(referrer));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Profile creation
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn profile_created_atomically_on_first_try() {
        let f = fixture();
        let result = f.handler.handle(command(None)).await.unwrap();

        assert_eq!(result.profile, ProfileCreation::Atomic { attempts: 1 });
        let profile = f.store.profile(&result.user.id).unwrap();
        assert_eq!(profile.name, "Nina");
        assert_eq!(profile.email, "new@example.com");
    }

    #[tokio::test]
    async fn transient_errors_are_retried() {
        let f = fixture();
        f.store.fail_times(StoreOp::CreateProfileAtomic, 2);

        let result = f.handler.handle(command(None)).await.unwrap();
        assert_eq!(result.profile, ProfileCreation::Atomic { attempts: 3 });
        assert_eq!(f.store.calls(StoreOp::UpsertProfile), 0);
    }

    #[tokio::test]
    async fn exhausted_retries_use_fallback_and_leave_one_profile() {
        let f = fixture();
        f.store.fail(StoreOp::CreateProfileAtomic);

        let result = f.handler.handle(command(None)).await.unwrap();

        match &result.profile {
            ProfileCreation::Fallback {
                attempts, report, ..
            } => {
                assert_eq!(*attempts, 3);
                assert_eq!(report.profile, StepOutcome::Completed);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
        assert_eq!(f.store.profile_count(), 1);
        assert_eq!(f.store.profile(&result.user.id).unwrap().name, "Nina");
    }

    #[tokio::test]
    async fn procedure_rejection_skips_remaining_retries() {
        let f = fixture();
        f.store.reject_atomic_create("permission denied");

        let result = f.handler.handle(command(None)).await.unwrap();

        match &result.profile {
            ProfileCreation::Fallback {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(*attempts, 1);
                assert_eq!(last_error, "permission denied");
            }
            other => panic!("expected fallback, got {:?}", other),
        }
        assert_eq!(f.store.calls(StoreOp::CreateProfileAtomic), 1);
    }

    #[tokio::test]
    async fn total_profile_failure_does_not_abort_signup() {
        let f = fixture();
        f.store.fail(StoreOp::CreateProfileAtomic);
        f.store.fail(StoreOp::UpsertProfile);
        f.store.fail(StoreOp::InitializeRewards);

        let result = f.handler.handle(command(None)).await.unwrap();

        match &result.profile {
            ProfileCreation::Fallback { report, .. } => {
                assert!(report.profile.is_failed());
                assert!(report.rewards.is_failed());
            }
            other => panic!("expected fallback, got {:?}", other),
        }
        assert_eq!(f.store.profile_count(), 0);
        assert_eq!(result.user.email, "new@example.com");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Referral rewards
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn no_code_leaves_rewards_untouched() {
        let f = fixture();
        let result = f.handler.handle(command(None)).await.unwrap();

        assert_eq!(result.welcome_bonus, StepOutcome::Skipped);
        assert_eq!(result.attribution, StepOutcome::Skipped);
        assert!(f.store.rewards(&result.user.id).is_none());
        assert_eq!(f.store.calls(StoreOp::UpsertRewards), 0);
        assert_eq!(f.store.calls(StoreOp::InitializeRewards), 0);
    }

    #[tokio::test]
    async fn valid_code_grants_bonus_and_attributes_referral() {
        let f = fixture();
        let (referrer, _) = seed_referrer(&f.store);

        let result = f
            .handler
            .handle(command(Some("DREAMJOH8X2K4")))
            .await
            .unwrap();

        assert_eq!(result.referrer_id.as_ref(), Some(&referrer));
        assert_eq!(result.welcome_bonus, StepOutcome::Completed);
        assert_eq!(result.attribution, StepOutcome::Completed);
        assert_eq!(f.store.rewards(&result.user.id).unwrap().total_points, 10);

        let referrals = f.store.referrals();
        assert_eq!(referrals.len(), 1);
        assert_eq!(referrals[0].referrer_id, referrer);
        assert_eq!(referrals[0].referred_id, result.user.id);
        assert_eq!(f.store.rewards(&referrer).unwrap().total_referrals, 1);
    }

    #[tokio::test]
    async fn bonus_failure_is_reported_not_raised() {
        let f = fixture();
        seed_referrer(&f.store);
        f.store.fail(StoreOp::UpsertRewards);

        let result = f
            .handler
            .handle(command(Some("DREAMJOH8X2K4")))
            .await
            .unwrap();

        assert!(result.welcome_bonus.is_failed());
        assert!(f.store.rewards(&result.user.id).is_none());
    }
}
