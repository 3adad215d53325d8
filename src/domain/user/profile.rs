//! User profile entity and the draft used to create it.

use serde::{Deserialize, Serialize};

use super::values::{DreamFrequency, JournalExperience, NotificationHour, PrivacyLevel};
use crate::domain::foundation::{Timestamp, UserId};

/// Placeholder name given to profiles created without signup data.
pub const PLACEHOLDER_NAME: &str = "User";

/// Goal seeded into minimal profiles.
pub const DEFAULT_GOAL: &str = "Better understand my dreams";

/// Profile fields supplied at creation time.
///
/// Sent to the atomic creation procedure and to the direct-write paths.
/// Keyed by `user_id`; every write of a draft is an upsert on that key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub dream_frequency: DreamFrequency,
    pub journal_experience: JournalExperience,
    pub goals: Vec<String>,
    pub notification_hour: NotificationHour,
    pub privacy_level: PrivacyLevel,
}

impl ProfileDraft {
    /// The minimal default profile inserted when nothing else is known.
    pub fn minimal(user_id: UserId) -> Self {
        Self {
            user_id,
            name: PLACEHOLDER_NAME.to_string(),
            email: String::new(),
            dream_frequency: DreamFrequency::default(),
            journal_experience: JournalExperience::default(),
            goals: vec![DEFAULT_GOAL.to_string()],
            notification_hour: NotificationHour::default(),
            privacy_level: PrivacyLevel::default(),
        }
    }

    /// Materializes the draft as a profile stamped at `now`.
    pub fn into_profile(self, now: Timestamp) -> UserProfile {
        UserProfile {
            id: self.user_id,
            name: self.name,
            email: self.email,
            dream_frequency: self.dream_frequency,
            journal_experience: self.journal_experience,
            goals: self.goals,
            notification_hour: self.notification_hour,
            privacy_level: self.privacy_level,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One profile per identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub dream_frequency: DreamFrequency,
    pub journal_experience: JournalExperience,
    pub goals: Vec<String>,
    pub notification_hour: NotificationHour,
    pub privacy_level: PrivacyLevel,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserProfile {
    /// In-memory defaults for a session whose profile could not be provisioned.
    pub fn defaults_for(user_id: UserId) -> Self {
        ProfileDraft::minimal(user_id).into_profile(Timestamp::now())
    }

    /// True while the profile still carries the placeholder name.
    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER_NAME && self.email.is_empty()
    }
}
