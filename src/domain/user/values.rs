//! Profile preference value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// How often the user remembers dreams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DreamFrequency {
    Rarely,
    #[default]
    Sometimes,
    Often,
    Always,
}

impl DreamFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            DreamFrequency::Rarely => "rarely",
            DreamFrequency::Sometimes => "sometimes",
            DreamFrequency::Often => "often",
            DreamFrequency::Always => "always",
        }
    }

    /// Parses the stored lowercase form.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_lowercase().as_str() {
            "rarely" => Ok(DreamFrequency::Rarely),
            "sometimes" => Ok(DreamFrequency::Sometimes),
            "often" => Ok(DreamFrequency::Often),
            "always" => Ok(DreamFrequency::Always),
            other => Err(ValidationError::invalid_format(
                "dream_frequency",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

impl fmt::Display for DreamFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Self-reported journaling experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalExperience {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl JournalExperience {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalExperience::Beginner => "beginner",
            JournalExperience::Intermediate => "intermediate",
            JournalExperience::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(JournalExperience::Beginner),
            "intermediate" => Ok(JournalExperience::Intermediate),
            "advanced" => Ok(JournalExperience::Advanced),
            other => Err(ValidationError::invalid_format(
                "journal_experience",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

impl fmt::Display for JournalExperience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much of the user's journal may be shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    #[default]
    High,
    Medium,
    Low,
}

impl PrivacyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyLevel::High => "high",
            PrivacyLevel::Medium => "medium",
            PrivacyLevel::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_lowercase().as_str() {
            "high" => Ok(PrivacyLevel::High),
            "medium" => Ok(PrivacyLevel::Medium),
            "low" => Ok(PrivacyLevel::Low),
            other => Err(ValidationError::invalid_format(
                "privacy_level",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

impl fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Preferred reminder hour of day, 0-23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct NotificationHour(u8);

impl NotificationHour {
    /// Evening reminder used for minimal profiles.
    pub const DEFAULT: NotificationHour = NotificationHour(21);

    pub fn try_new(hour: i32) -> Result<Self, ValidationError> {
        if !(0..=23).contains(&hour) {
            return Err(ValidationError::out_of_range("notification_hour", 0, 23, hour));
        }
        Ok(Self(hour as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for NotificationHour {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i32> for NotificationHour {
    type Error = ValidationError;

    fn try_from(hour: i32) -> Result<Self, Self::Error> {
        Self::try_new(hour)
    }
}

impl From<NotificationHour> for i32 {
    fn from(hour: NotificationHour) -> Self {
        hour.0 as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_roundtrip_through_stored_form() {
        for f in [
            DreamFrequency::Rarely,
            DreamFrequency::Sometimes,
            DreamFrequency::Often,
            DreamFrequency::Always,
        ] {
            assert_eq!(DreamFrequency::parse(f.as_str()).unwrap(), f);
        }
        assert_eq!(
            JournalExperience::parse("Advanced").unwrap(),
            JournalExperience::Advanced
        );
        assert_eq!(PrivacyLevel::parse("LOW").unwrap(), PrivacyLevel::Low);
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(DreamFrequency::parse("nightly").is_err());
        assert!(JournalExperience::parse("expert").is_err());
        assert!(PrivacyLevel::parse("none").is_err());
    }

    #[test]
    fn defaults_match_minimal_profile() {
        assert_eq!(DreamFrequency::default(), DreamFrequency::Sometimes);
        assert_eq!(JournalExperience::default(), JournalExperience::Beginner);
        assert_eq!(PrivacyLevel::default(), PrivacyLevel::High);
        assert_eq!(NotificationHour::default().value(), 21);
    }

    #[test]
    fn notification_hour_bounds() {
        assert!(NotificationHour::try_new(0).is_ok());
        assert!(NotificationHour::try_new(23).is_ok());
        assert!(NotificationHour::try_new(24).is_err());
        assert!(NotificationHour::try_new(-1).is_err());
    }

    #[test]
    fn notification_hour_deserialization_validates() {
        let ok: NotificationHour = serde_json::from_str("7").unwrap();
        assert_eq!(ok.value(), 7);
        assert!(serde_json::from_str::<NotificationHour>("30").is_err());
    }

    #[test]
    fn enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&DreamFrequency::Often).unwrap(),
            "\"often\""
        );
    }
}
