//! HTTP DTOs for account endpoints.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::application::{
    ProfileCreation, ProfilePreferences, ProfileProvisioning, SignUpCommand, SignUpResult,
    StepOutcome,
};
use crate::domain::foundation::AuthenticatedUser;
use crate::domain::user::{
    DreamFrequency, JournalExperience, NotificationHour, PrivacyLevel, UserProfile,
};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to create an account. Onboarding answers are optional.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: SecretString,
    pub name: String,
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub dream_frequency: Option<DreamFrequency>,
    #[serde(default)]
    pub journal_experience: Option<JournalExperience>,
    #[serde(default)]
    pub goals: Option<Vec<String>>,
    #[serde(default)]
    pub notification_hour: Option<NotificationHour>,
    #[serde(default)]
    pub privacy_level: Option<PrivacyLevel>,
}

impl SignUpRequest {
    pub fn into_command(self) -> SignUpCommand {
        let defaults = ProfilePreferences::default();
        let goals = self
            .goals
            .filter(|g| !g.is_empty())
            .unwrap_or(defaults.goals);

        SignUpCommand {
            email: self.email,
            password: self.password,
            name: self.name,
            referral_code: self.referral_code,
            preferences: ProfilePreferences {
                dream_frequency: self.dream_frequency.unwrap_or(defaults.dream_frequency),
                journal_experience: self
                    .journal_experience
                    .unwrap_or(defaults.journal_experience),
                goals,
                notification_hour: self.notification_hour.unwrap_or(defaults.notification_hour),
                privacy_level: self.privacy_level.unwrap_or(defaults.privacy_level),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: SecretString,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

impl From<AuthenticatedUser> for UserResponse {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            display_name: user.display_name,
            email_verified: user.email_verified,
        }
    }
}

/// Signup result. Steps after identity creation report their outcome
/// instead of failing the request.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub user: UserResponse,
    pub profile: ProfileCreation,
    pub referrer_id: Option<String>,
    pub welcome_bonus: StepOutcome,
    pub attribution: StepOutcome,
}

impl From<SignUpResult> for SignUpResponse {
    fn from(result: SignUpResult) -> Self {
        Self {
            user: result.user.into(),
            profile: result.profile,
            referrer_id: result.referrer_id.map(|id| id.to_string()),
            welcome_bonus: result.welcome_bonus,
            attribution: result.attribution,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: Option<u64>,
    pub user: UserResponse,
}

/// Where the returned profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    Ensured,
    Found,
    Created,
    /// Store unavailable; in-memory defaults.
    Defaults,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub source: ProfileSource,
    pub profile: UserProfile,
}

impl ProfileResponse {
    pub fn from_provisioning(
        provisioning: ProfileProvisioning,
        user_id: &crate::domain::foundation::UserId,
    ) -> Self {
        let source = match &provisioning {
            ProfileProvisioning::Ensured(_) => ProfileSource::Ensured,
            ProfileProvisioning::Found(_) => ProfileSource::Found,
            ProfileProvisioning::Created(_) => ProfileSource::Created,
            ProfileProvisioning::Unavailable { .. } => ProfileSource::Defaults,
        };
        Self {
            source,
            profile: provisioning.profile_or_defaults(user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::user::DEFAULT_GOAL;
    use secrecy::ExposeSecret;

    #[test]
    fn minimal_signup_request_uses_default_preferences() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{"email":"a@example.com","password":"hunter22","name":"Ann"}"#,
        )
        .unwrap();
        let cmd = req.into_command();

        assert_eq!(cmd.password.expose_secret(), "hunter22");
        assert_eq!(cmd.referral_code, None);
        assert_eq!(cmd.preferences, ProfilePreferences::default());
        assert_eq!(cmd.preferences.goals, vec![DEFAULT_GOAL.to_string()]);
    }

    #[test]
    fn signup_request_carries_answers() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{
                "email": "a@example.com",
                "password": "hunter22",
                "name": "Ann",
                "referral_code": "DREAMJOH8X2K4",
                "dream_frequency": "often",
                "goals": [],
                "notification_hour": 7,
                "privacy_level": "low"
            }"#,
        )
        .unwrap();
        let cmd = req.into_command();

        assert_eq!(cmd.referral_code.as_deref(), Some("DREAMJOH8X2K4"));
        assert_eq!(cmd.preferences.dream_frequency, DreamFrequency::Often);
        assert_eq!(cmd.preferences.notification_hour.value(), 7);
        assert_eq!(cmd.preferences.privacy_level, PrivacyLevel::Low);
        // empty goal list falls back to the default goal
        assert_eq!(cmd.preferences.goals, vec![DEFAULT_GOAL.to_string()]);
    }

    #[test]
    fn out_of_range_hour_is_rejected() {
        let result = serde_json::from_str::<SignUpRequest>(
            r#"{"email":"a@example.com","password":"x","name":"A","notification_hour":24}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unavailable_profile_reports_defaults() {
        let user_id = UserId::new("user-1").unwrap();
        let response = ProfileResponse::from_provisioning(
            ProfileProvisioning::Unavailable {
                reason: "down".into(),
            },
            &user_id,
        );
        assert_eq!(response.source, ProfileSource::Defaults);
        assert_eq!(response.profile.id, user_id);
    }
}
