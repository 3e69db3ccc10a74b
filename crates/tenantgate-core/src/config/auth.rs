//! Authentication and policy configuration.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Credential, token and policy configuration.
///
/// `Debug` output never contains key or password material.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Server-side API key expected in `X-API-Key`. Unset disables the scheme.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Webhook keys by lender code. Lookup is case-insensitive.
    #[serde(default)]
    pub webhook_keys: HashMap<String, String>,
    /// Credentials accepted by the Basic scheme. Unset disables the scheme.
    #[serde(default)]
    pub basic: Option<BasicCredentials>,
    /// Bearer token validation settings.
    #[serde(default)]
    pub jwt: JwtConfig,
    /// Append a session requirement to every dynamically built policy.
    #[serde(default)]
    pub enforce_session: bool,
    /// Office used when no office id can be resolved from the request.
    #[serde(default = "default_office_id")]
    pub default_office_id: i64,
    /// Operations (`"METHOD /route/template"`) that skip the office gate.
    #[serde(default = "default_bootstrap_operations")]
    pub bootstrap_operations: Vec<String>,
}

/// Username/password pair for the Basic scheme.
#[derive(Clone, Serialize, Deserialize)]
pub struct BasicCredentials {
    /// Expected username.
    pub username: String,
    /// Expected password.
    pub password: String,
}

/// Bearer token validation settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC secret used to verify token signatures.
    #[serde(default)]
    pub secret: Option<String>,
    /// Expected `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Expected `aud` claim.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Allowed clock skew in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: default_issuer(),
            audience: default_audience(),
            leeway_seconds: default_leeway(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            webhook_keys: HashMap::new(),
            basic: None,
            jwt: JwtConfig::default(),
            enforce_session: false,
            default_office_id: default_office_id(),
            bootstrap_operations: default_bootstrap_operations(),
        }
    }
}

impl AuthConfig {
    /// Looks up the webhook key for a lender code, ignoring case.
    pub fn webhook_key(&self, lender_code: &str) -> Option<&str> {
        self.webhook_keys
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(lender_code))
            .map(|(_, key)| key.as_str())
    }

    /// Returns whether an operation is on the bootstrap allow-list.
    pub fn is_bootstrap_operation(&self, operation: &str) -> bool {
        self.bootstrap_operations
            .iter()
            .any(|op| op.eq_ignore_ascii_case(operation))
    }
}

const REDACTED: &str = "<redacted>";

fn redact<T>(value: &Option<T>) -> Option<&'static str> {
    value.as_ref().map(|_| REDACTED)
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lenders: Vec<&str> = self.webhook_keys.keys().map(String::as_str).collect();
        lenders.sort_unstable();
        f.debug_struct("AuthConfig")
            .field("api_key", &redact(&self.api_key))
            .field("webhook_lenders", &lenders)
            .field("basic", &self.basic)
            .field("jwt", &self.jwt)
            .field("enforce_session", &self.enforce_session)
            .field("default_office_id", &self.default_office_id)
            .field("bootstrap_operations", &self.bootstrap_operations)
            .finish()
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &redact(&self.secret))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

fn default_office_id() -> i64 {
    1
}

fn default_bootstrap_operations() -> Vec<String> {
    vec![
        "GET /api/offices/mine".to_string(),
        "GET /api/users/me".to_string(),
        "GET /api/offices/{officeId}/bootstrap".to_string(),
    ]
}

fn default_issuer() -> String {
    "tenantgate".to_string()
}

fn default_audience() -> String {
    "tenantgate-api".to_string()
}

fn default_leeway() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig {
            api_key: Some("api-key-material".into()),
            webhook_keys: HashMap::from([("ACME".to_string(), "webhook-key-material".to_string())]),
            basic: Some(BasicCredentials {
                username: "ops".into(),
                password: "password-material".into(),
            }),
            jwt: JwtConfig {
                secret: Some("jwt-secret-material".into()),
                ..JwtConfig::default()
            },
            ..AuthConfig::default()
        };

        let rendered = format!("{config:?}");
        for secret in [
            "api-key-material",
            "webhook-key-material",
            "password-material",
            "jwt-secret-material",
        ] {
            assert!(!rendered.contains(secret), "{secret} leaked: {rendered}");
        }
        assert!(rendered.contains("ACME"));
        assert!(rendered.contains("ops"));
        assert!(rendered.contains(REDACTED));
    }

    #[test]
    fn test_webhook_key_lookup_ignores_case() {
        let config = AuthConfig {
            webhook_keys: HashMap::from([("ACME".to_string(), "k".to_string())]),
            ..AuthConfig::default()
        };
        assert_eq!(config.webhook_key("acme"), Some("k"));
        assert_eq!(config.webhook_key("other"), None);
    }
}
