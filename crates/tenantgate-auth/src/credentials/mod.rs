//! Credential resolution across the five schemes.
//!
//! Resolvers run in [`PRECEDENCE`] order. The first success wins; failures
//! are recorded and the next scheme is tried. When an `Authorization`
//! header is present the API-key and session resolvers abstain, so only the
//! schemes carried by that header can authenticate the request.

pub mod api_key;
pub mod basic;
pub mod bearer;
pub mod session;
pub mod webhook;

use std::sync::Arc;

use tracing::{debug, error, info};

use tenantgate_core::config::AuthConfig;
use tenantgate_core::traits::{SessionStore, TokenValidator};
use tenantgate_core::types::{Principal, RequestContext, SchemeKind, headers};

use crate::outcome::AuthFailure;

/// Fixed order in which schemes are tried.
pub const PRECEDENCE: [SchemeKind; 5] = [
    SchemeKind::ApiKey,
    SchemeKind::Session,
    SchemeKind::Bearer,
    SchemeKind::Webhook,
    SchemeKind::Basic,
];

/// What a single resolver concluded.
#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    /// The scheme authenticated the caller.
    Success(Principal),
    /// The request does not use this scheme.
    NoOpinion,
    /// The request uses this scheme but the credential was rejected.
    Fail(CredentialFailure),
}

impl ResolveOutcome {
    pub(crate) fn fail(scheme: SchemeKind, reason: AuthFailure, detail: impl Into<String>) -> Self {
        Self::Fail(CredentialFailure {
            scheme,
            reason,
            detail: detail.into(),
        })
    }

    pub fn is_no_opinion(&self) -> bool {
        matches!(self, Self::NoOpinion)
    }
}

/// Diagnostic record of a rejected credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFailure {
    pub scheme: SchemeKind,
    pub reason: AuthFailure,
    /// Human-readable reason for logs; never echoed to the caller.
    pub detail: String,
}

/// Result of running every resolver against one request.
#[derive(Debug, Clone, Default)]
pub struct Authentication {
    /// The authenticated principal, `None` for anonymous callers.
    pub principal: Option<Principal>,
    /// Failures recorded before a scheme succeeded (or all of them).
    pub failures: Vec<CredentialFailure>,
}

/// Runs the credential resolvers against a request.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    config: Arc<AuthConfig>,
    sessions: Arc<dyn SessionStore>,
    tokens: Option<Arc<dyn TokenValidator>>,
}

impl CredentialResolver {
    /// `tokens` may be `None` when bearer tokens are not accepted.
    pub fn new(
        config: Arc<AuthConfig>,
        sessions: Arc<dyn SessionStore>,
        tokens: Option<Arc<dyn TokenValidator>>,
    ) -> Self {
        Self {
            config,
            sessions,
            tokens,
        }
    }

    /// Runs a single scheme's resolver.
    pub async fn resolve(&self, scheme: SchemeKind, request: &RequestContext) -> ResolveOutcome {
        if abstains_for_authorization_header(scheme, request) {
            return ResolveOutcome::NoOpinion;
        }
        match scheme {
            SchemeKind::ApiKey => api_key::resolve(&self.config, request),
            SchemeKind::Session => session::resolve(self.sessions.as_ref(), request).await,
            SchemeKind::Bearer => bearer::resolve(self.tokens.as_deref(), request).await,
            SchemeKind::Webhook => webhook::resolve(&self.config, request),
            SchemeKind::Basic => basic::resolve(&self.config, request),
        }
    }

    /// Tries every scheme in precedence order until one succeeds.
    pub async fn authenticate(&self, request: &RequestContext) -> Authentication {
        let mut failures = Vec::new();

        for scheme in PRECEDENCE {
            match self.resolve(scheme, request).await {
                ResolveOutcome::Success(principal) => {
                    info!(%scheme, name = principal.name().unwrap_or_default(), "Caller authenticated");
                    return Authentication {
                        principal: Some(principal),
                        failures,
                    };
                }
                ResolveOutcome::NoOpinion => {}
                ResolveOutcome::Fail(failure) => {
                    log_failure(&failure);
                    failures.push(failure);
                }
            }
        }

        debug!(failures = failures.len(), "No credential scheme authenticated the caller");
        Authentication {
            principal: None,
            failures,
        }
    }
}

/// API-key and session credentials are ignored whenever an `Authorization`
/// header is present.
fn abstains_for_authorization_header(scheme: SchemeKind, request: &RequestContext) -> bool {
    matches!(scheme, SchemeKind::ApiKey | SchemeKind::Session)
        && request.header(headers::AUTHORIZATION).is_some()
}

/// Strips an `Authorization` scheme prefix, ignoring its case.
pub(crate) fn strip_scheme<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

fn log_failure(failure: &CredentialFailure) {
    if failure.reason == AuthFailure::ServerMisconfigured {
        error!(scheme = %failure.scheme, detail = %failure.detail, "Credential scheme misconfigured");
    } else {
        info!(
            scheme = %failure.scheme,
            reason = %failure.reason,
            detail = %failure.detail,
            "Credential rejected"
        );
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use tenantgate_core::error::AppError;
    use tenantgate_core::result::AppResult;
    use tenantgate_core::traits::{SessionStore, TokenValidator};
    use tenantgate_core::types::TokenClaims;

    /// Session store that knows a fixed set of session ids.
    #[derive(Debug, Default)]
    pub struct KnownSessions(pub HashSet<String>);

    #[async_trait]
    impl SessionStore for KnownSessions {
        async fn is_valid_session_id(&self, id: &str, _: &CancellationToken) -> AppResult<bool> {
            Ok(self.0.contains(id))
        }

        async fn is_valid(&self, id: &str, _: &str, _: &CancellationToken) -> AppResult<bool> {
            Ok(self.0.contains(id))
        }

        async fn is_user_valid(
            &self,
            id: &str,
            _: &str,
            _: &str,
            _: &CancellationToken,
        ) -> AppResult<bool> {
            Ok(self.0.contains(id))
        }
    }

    /// Accepts exactly one token string.
    #[derive(Debug)]
    pub struct StaticTokens {
        pub token: String,
        pub claims: TokenClaims,
    }

    #[async_trait]
    impl TokenValidator for StaticTokens {
        async fn validate(&self, token: &str, _: &CancellationToken) -> AppResult<TokenClaims> {
            if token == self.token {
                Ok(self.claims.clone())
            } else {
                Err(AppError::authentication("Invalid token signature"))
            }
        }
    }
}
