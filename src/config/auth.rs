//! Auth provider settings (GoTrue)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Project URL; the GoTrue API lives under `/auth/v1`
    pub url: String,

    /// Public anon key sent as the `apikey` header
    pub anon_key: Secret<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl AuthConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// In production the auth URL must be HTTPS.
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__URL"));
        }
        if self.anon_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ANON_KEY"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ValidationError::InvalidUrl("AUTH__URL"));
        }
        if environment == Environment::Production && !self.url.starts_with("https://") {
            return Err(ValidationError::AuthUrlMustBeHttps);
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, key: &str) -> AuthConfig {
        AuthConfig {
            url: url.to_string(),
            anon_key: Secret::new(key.to_string()),
            request_timeout_secs: default_request_timeout(),
        }
    }

    #[test]
    fn missing_anon_key_is_required() {
        let err = config("https://x.supabase.co", " ")
            .validate(Environment::Development)
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingRequired("AUTH__ANON_KEY")));
    }

    #[test]
    fn plain_http_only_outside_production() {
        let config = config("http://localhost:9999", "anon");
        assert!(config.validate(Environment::Development).is_ok());
        assert!(matches!(
            config.validate(Environment::Production),
            Err(ValidationError::AuthUrlMustBeHttps)
        ));
    }

    #[test]
    fn url_needs_a_scheme() {
        assert!(config("x.supabase.co", "anon")
            .validate(Environment::Development)
            .is_err());
    }

    #[test]
    fn debug_output_hides_anon_key() {
        let rendered = format!("{:?}", config("https://x.supabase.co", "super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
