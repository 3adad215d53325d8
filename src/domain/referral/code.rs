//! Referral code value object.
//!
//! Codes are stored and compared upper-cased. Generated codes have the shape
//! `DREAM` + three letters of the owner's name + five random characters,
//! e.g. `DREAMJOH8X2K4`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;

/// Fixed prefix of every generated code.
pub const CODE_PREFIX: &str = "DREAM";

/// Number of name letters embedded after the prefix.
pub const NAME_PART_LEN: usize = 3;

/// Number of random characters closing the code.
pub const SUFFIX_LEN: usize = 5;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A normalized referral code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferralCode(String);

impl ReferralCode {
    /// Trims and upper-cases user input.
    ///
    /// # Errors
    ///
    /// `EmptyField` when nothing is left after trimming.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("referral_code"));
        }
        Ok(Self(normalized))
    }

    /// Builds a code for `user_name` with the given random suffix.
    ///
    /// Non-letters are dropped from the name; short names are padded with `X`.
    pub fn derive(user_name: &str, suffix: &str) -> Result<Self, ValidationError> {
        let suffix = suffix.trim().to_uppercase();
        if suffix.len() != SUFFIX_LEN || !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::invalid_format(
                "referral_code_suffix",
                format!("expected {} alphanumeric characters", SUFFIX_LEN),
            ));
        }

        Ok(Self(format!(
            "{}{}{}",
            CODE_PREFIX,
            Self::name_part(user_name),
            suffix
        )))
    }

    /// Generates a fresh code with a random suffix.
    pub fn generate(user_name: &str) -> Self {
        Self(format!(
            "{}{}{}",
            CODE_PREFIX,
            Self::name_part(user_name),
            random_suffix()
        ))
    }

    fn name_part(user_name: &str) -> String {
        let mut part: String = user_name
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .take(NAME_PART_LEN)
            .collect::<String>()
            .to_uppercase();
        while part.len() < NAME_PART_LEN {
            part.push('X');
        }
        part
    }

    /// Wraps a code read back from the store without re-validating its shape.
    pub fn from_stored(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Five random upper-case alphanumerics.
pub fn random_suffix() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| SUFFIX_ALPHABET[*b as usize % SUFFIX_ALPHABET.len()] as char)
        .collect()
}

impl TryFrom<String> for ReferralCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReferralCode> for String {
    fn from(code: ReferralCode) -> Self {
        code.0
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let code = ReferralCode::parse("  dreamjoh8x2k4 ").unwrap();
        assert_eq!(code.as_str(), "DREAMJOH8X2K4");
    }

    #[test]
    fn parse_rejects_blank_input() {
        assert!(ReferralCode::parse("").is_err());
        assert!(ReferralCode::parse("   ").is_err());
    }

    #[test]
    fn derive_matches_documented_shape() {
        let code = ReferralCode::derive("John", "8x2k4").unwrap();
        assert_eq!(code.as_str(), "DREAMJOH8X2K4");
    }

    #[test]
    fn derive_pads_short_names() {
        let code = ReferralCode::derive("Al", "ABCDE").unwrap();
        assert_eq!(code.as_str(), "DREAMALXABCDE");

        let code = ReferralCode::derive("", "ABCDE").unwrap();
        assert_eq!(code.as_str(), "DREAMXXXABCDE");
    }

    #[test]
    fn derive_skips_non_letters_in_name() {
        let code = ReferralCode::derive("J. O'Neil", "ABCDE").unwrap();
        assert_eq!(code.as_str(), "DREAMJONABCDE");
    }

    #[test]
    fn derive_rejects_bad_suffix() {
        assert!(ReferralCode::derive("John", "ABC").is_err());
        assert!(ReferralCode::derive("John", "AB-DE").is_err());
    }

    #[test]
    fn generated_codes_have_expected_length_and_prefix() {
        let code = ReferralCode::generate("Maria");
        assert!(code.as_str().starts_with("DREAMMAR"));
        assert_eq!(code.as_str().len(), CODE_PREFIX.len() + NAME_PART_LEN + SUFFIX_LEN);
        assert!(code.as_str().chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn deserialization_normalizes() {
        let code: ReferralCode = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(code.as_str(), "ABC");
        assert!(serde_json::from_str::<ReferralCode>("\" \"").is_err());
    }
}
