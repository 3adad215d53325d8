//! User domain module.
//!
//! The journaling profile attached to each auth identity.

mod profile;
mod values;

pub use profile::{ProfileDraft, UserProfile, DEFAULT_GOAL, PLACEHOLDER_NAME};
pub use values::{DreamFrequency, JournalExperience, NotificationHour, PrivacyLevel};
