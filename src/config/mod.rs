//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `DREAM_JOURNAL` prefix and
//! `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use dream_journal::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod provisioning;
mod referral;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use provisioning::ProvisioningConfig;
pub use referral::ReferralConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub auth: AuthConfig,

    #[serde(default)]
    pub referral: ReferralConfig,

    #[serde(default)]
    pub provisioning: ProvisioningConfig,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Reads `.env` when present, then `DREAM_JOURNAL__*` variables:
    ///
    /// - `DREAM_JOURNAL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DREAM_JOURNAL__AUTH__ANON_KEY=...` -> `auth.anon_key = ...`
    ///
    /// # Errors
    ///
    /// `ConfigError::LoadError` when a required variable is missing or a value
    /// does not parse.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("DREAM_JOURNAL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(self.server.environment)?;
        self.referral.validate()?;
        self.provisioning.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "DREAM_JOURNAL__DATABASE__URL",
        "DREAM_JOURNAL__AUTH__URL",
        "DREAM_JOURNAL__AUTH__ANON_KEY",
        "DREAM_JOURNAL__SERVER__PORT",
        "DREAM_JOURNAL__SERVER__ENVIRONMENT",
        "DREAM_JOURNAL__REFERRAL__PUBLIC_BASE_URL",
        "DREAM_JOURNAL__PROVISIONING__MAX_ATTEMPTS",
    ];

    fn set_minimal_env() {
        env::set_var("DREAM_JOURNAL__DATABASE__URL", "postgresql://test@localhost/dreams");
        env::set_var("DREAM_JOURNAL__AUTH__URL", "https://project.supabase.co");
        env::set_var("DREAM_JOURNAL__AUTH__ANON_KEY", "anon-key");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn loads_minimal_environment_with_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/dreams");
        assert_eq!(config.auth.anon_key.expose_secret(), "anon-key");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.referral.points_per_referral, 30);
        assert_eq!(config.provisioning.max_attempts, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_overrides_apply() {
        let config = load_with(&[
            ("DREAM_JOURNAL__SERVER__PORT", "3000"),
            ("DREAM_JOURNAL__REFERRAL__PUBLIC_BASE_URL", "https://dreamjournal.app"),
            ("DREAM_JOURNAL__PROVISIONING__MAX_ATTEMPTS", "2"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.referral.public_base_url, "https://dreamjournal.app");
        assert_eq!(config.provisioning.retry_policy().max_attempts, 2);
    }

    #[test]
    fn production_flag_reads_environment() {
        let config = load_with(&[("DREAM_JOURNAL__SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn missing_auth_section_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        clear_env();
        env::set_var("DREAM_JOURNAL__DATABASE__URL", "postgresql://test@localhost/dreams");
        let result = AppConfig::load();
        clear_env();
        assert!(result.is_err());
    }
}
