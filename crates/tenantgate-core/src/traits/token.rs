//! Bearer token validation collaborator.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::result::AppResult;
use crate::types::TokenClaims;

/// Validates a bearer token against the configured issuer and audience.
#[async_trait]
pub trait TokenValidator: Send + Sync + std::fmt::Debug {
    /// Returns the token's claims, or an authentication error.
    async fn validate(&self, token: &str, cancel: &CancellationToken) -> AppResult<TokenClaims>;
}
