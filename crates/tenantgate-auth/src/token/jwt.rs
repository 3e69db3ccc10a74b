//! HS256 JWT validation against the configured issuer and audience.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tokio_util::sync::CancellationToken;

use tenantgate_core::config::JwtConfig;
use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::TokenValidator;
use tenantgate_core::types::TokenClaims;

/// Validates bearer tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtTokenValidator {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtTokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenValidator")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtTokenValidator {
    /// Creates a validator; fails if no secret is configured.
    pub fn new(config: &JwtConfig) -> AppResult<Self> {
        let secret = config
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::configuration("JWT secret is not configured"))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    fn decode_token(&self, token: &str) -> AppResult<TokenClaims> {
        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    JwtErrorKind::ExpiredSignature => AppError::authentication("Token has expired"),
                    JwtErrorKind::InvalidToken => AppError::authentication("Invalid token format"),
                    JwtErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    JwtErrorKind::InvalidIssuer => AppError::authentication("Invalid token issuer"),
                    JwtErrorKind::InvalidAudience => {
                        AppError::authentication("Invalid token audience")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl TokenValidator for JwtTokenValidator {
    async fn validate(&self, token: &str, cancel: &CancellationToken) -> AppResult<TokenClaims> {
        if cancel.is_cancelled() {
            return Err(AppError::cancelled("request cancelled"));
        }
        self.decode_token(token)
    }
}
