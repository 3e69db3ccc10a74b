//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. The merged [`AppConfig`] is loaded once at process start and
//! handed to components by construction; nothing mutates it afterwards.

pub mod auth;
pub mod cache;
pub mod crypto;
pub mod logging;
pub mod throttling;

use serde::{Deserialize, Serialize};

pub use self::auth::{AuthConfig, BasicCredentials, JwtConfig};
pub use self::cache::{CacheConfig, MemoryCacheConfig, RedisCacheConfig};
pub use self::crypto::CryptoConfig;
pub use self::logging::LoggingConfig;
pub use self::throttling::ThrottlingConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credential and policy settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Failed-validation throttling settings.
    #[serde(default)]
    pub throttling: ThrottlingConfig,
    /// Hashing and password settings.
    #[serde(default)]
    pub crypto: CryptoConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `TENANTGATE_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TENANTGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert!(config.auth.api_key.is_none());
        assert_eq!(config.throttling.max_failures, 5);
        assert_eq!(config.cache.provider, "memory");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_webhook_keys_parse() {
        let config = AppConfig::from_toml(
            r#"
            [auth]
            api_key = "k-123"
            enforce_session = true

            [auth.webhook_keys]
            ACME = "SECRET123"
            "#,
        )
        .unwrap();
        assert_eq!(config.auth.api_key.as_deref(), Some("k-123"));
        assert!(config.auth.enforce_session);
        assert_eq!(config.auth.webhook_key("acme"), Some("SECRET123"));
    }
}
