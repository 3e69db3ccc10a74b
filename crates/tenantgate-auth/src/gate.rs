//! `AuthGate`: credential resolution, policy expansion, requirement
//! evaluation, and result mapping behind one handle.

use std::sync::Arc;

use tracing::{info, warn};

use tenantgate_cache::CacheManager;
use tenantgate_core::config::AppConfig;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::{IdentityService, SessionStore, ThrottlingStore, TokenValidator};
use tenantgate_core::types::{Principal, RequestContext};

use crate::credentials::{Authentication, CredentialResolver};
use crate::crypto::ShortHasher;
use crate::outcome::{AuthorizationOutcome, Denial, map_outcome};
use crate::policy::PolicyResolver;
use crate::requirements::{RequirementEvaluator, SessionCheck};
use crate::session::CachedSessionStore;
use crate::throttling::{CacheThrottlingStore, PartitionKeyBuilder};
use crate::token::JwtTokenValidator;

/// Collaborators the gate consumes.
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub sessions: Arc<dyn SessionStore>,
    pub identity: Arc<dyn IdentityService>,
    pub throttling: Arc<dyn ThrottlingStore>,
    /// `None` disables the bearer scheme.
    pub tokens: Option<Arc<dyn TokenValidator>>,
}

/// Authenticates and authorizes requests.
#[derive(Debug)]
pub struct AuthGate {
    credentials: CredentialResolver,
    policies: PolicyResolver,
    evaluator: RequirementEvaluator,
}

impl AuthGate {
    /// Builds a gate from configuration and explicit collaborators.
    pub fn new(config: &AppConfig, collaborators: Collaborators) -> Self {
        let auth = Arc::new(config.auth.clone());
        let keys = PartitionKeyBuilder::new(ShortHasher::new(&config.crypto));

        let session_check = SessionCheck::new(
            Arc::clone(&collaborators.sessions),
            collaborators.throttling,
            keys,
        );

        Self {
            credentials: CredentialResolver::new(
                Arc::clone(&auth),
                collaborators.sessions,
                collaborators.tokens,
            ),
            policies: PolicyResolver::new(auth.enforce_session),
            evaluator: RequirementEvaluator::new(auth, collaborators.identity, session_check),
        }
    }

    /// Builds a gate whose session store, throttling store and token
    /// validator live on the shared cache. Only the identity service is
    /// supplied by the host.
    pub fn with_cache(
        config: &AppConfig,
        cache: Arc<CacheManager>,
        identity: Arc<dyn IdentityService>,
    ) -> AppResult<Self> {
        let tokens: Option<Arc<dyn TokenValidator>> = match config.auth.jwt.secret {
            Some(_) => Some(Arc::new(JwtTokenValidator::new(&config.auth.jwt)?)),
            None => {
                warn!("JWT secret not configured; bearer tokens will be rejected");
                None
            }
        };

        let collaborators = Collaborators {
            sessions: Arc::new(CachedSessionStore::new(Arc::clone(&cache))),
            identity,
            throttling: Arc::new(CacheThrottlingStore::new(cache, config.throttling.clone())),
            tokens,
        };
        info!(
            enforce_session = config.auth.enforce_session,
            max_failures = config.throttling.max_failures,
            "Auth gate initialized"
        );
        Ok(Self::new(config, collaborators))
    }

    /// Runs the credential resolvers.
    pub async fn authenticate(&self, request: &RequestContext) -> Authentication {
        self.credentials.authenticate(request).await
    }

    /// Evaluates a policy for an (optionally anonymous) principal.
    pub async fn authorize(
        &self,
        policy: &str,
        principal: Option<&Principal>,
        request: Option<&RequestContext>,
    ) -> AuthorizationOutcome {
        let policy = self.policies.resolve(policy);
        self.evaluator
            .evaluate(policy.requirements(), principal, request)
            .await
    }

    /// Evaluates a policy and maps a failure to what the caller is told.
    pub async fn check(
        &self,
        policy: &str,
        principal: Option<&Principal>,
        request: Option<&RequestContext>,
    ) -> Result<(), Denial> {
        let outcome = self.authorize(policy, principal, request).await;
        match map_outcome(&outcome, principal.is_some()) {
            None => Ok(()),
            Some(denial) => Err(denial),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;
    use crate::requirements::test_support::FakeIdentity;
    use tenantgate_core::config::AuthConfig;

    fn config(enforce_session: bool) -> AppConfig {
        AppConfig {
            auth: AuthConfig {
                api_key: Some("server-key".into()),
                webhook_keys: HashMap::from([("ACME".to_string(), "SECRET123".to_string())]),
                enforce_session,
                ..AuthConfig::default()
            },
            ..AppConfig::default()
        }
    }

    fn gate(config: &AppConfig, identity: FakeIdentity) -> (AuthGate, Arc<CacheManager>) {
        let cache = Arc::new(CacheManager::in_memory());
        let gate = AuthGate::with_cache(config, Arc::clone(&cache), Arc::new(identity)).unwrap();
        (gate, cache)
    }

    #[tokio::test]
    async fn test_api_key_caller_passes_session_enforced_policy() {
        let (gate, _) = gate(&config(true), FakeIdentity::with_permissions(["Loans.Read"]));
        let request = RequestContext::new()
            .with_header("X-API-Key", "server-key")
            .with_route("officeId", "42");
        let principal = gate.authenticate(&request).await.principal;
        assert!(
            gate.check("Loans.Read", principal.as_ref(), Some(&request))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_webhook_caller_without_permission_is_forbidden() {
        let (gate, _) = gate(&config(false), FakeIdentity::default());
        let request = RequestContext::new()
            .with_header("Authorization", "WebHookApiKey SECRET123")
            .with_route("lenderCode", "ACME");
        let principal = gate.authenticate(&request).await.principal;
        assert_eq!(principal.as_ref().and_then(Principal::name), Some("ACME"));
        assert_eq!(
            gate.check("Loans.Write", principal.as_ref(), Some(&request)).await,
            Err(Denial::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_unauthenticated() {
        let (gate, _) = gate(&config(false), FakeIdentity::default());
        let request = RequestContext::new();
        let principal = gate.authenticate(&request).await.principal;
        assert_eq!(
            gate.check("", principal.as_ref(), Some(&request)).await,
            Err(Denial::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_session_lifecycle_through_cache() {
        let (gate, cache) = gate(&config(true), FakeIdentity::default());
        let sessions = CachedSessionStore::new(cache);
        let id = sessions
            .create_session("device-1", Duration::from_secs(300))
            .await
            .unwrap();

        let good = RequestContext::new()
            .with_header("X-Session-Id", &id)
            .with_header("X-FingerPrint", "device-1");
        let principal = gate.authenticate(&good).await.principal;
        assert!(gate.check("", principal.as_ref(), Some(&good)).await.is_ok());

        let stolen = RequestContext::new()
            .with_header("X-Session-Id", &id)
            .with_header("X-FingerPrint", "device-2");
        let principal = gate.authenticate(&stolen).await.principal;
        assert_eq!(
            gate.check("", principal.as_ref(), Some(&stolen)).await,
            Err(Denial::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_unknown_session_guesses_lock_the_fingerprint() {
        use tenantgate_core::traits::ThrottlingStore;
        use tenantgate_core::types::Partition;

        let config = config(true);
        let (gate, cache) = gate(&config, FakeIdentity::default());

        for i in 0..20 {
            let guess = RequestContext::new()
                .with_header("X-Session-Id", format!("guess-{i}"))
                .with_header("X-FingerPrint", "fp1");
            let principal = gate.authenticate(&guess).await.principal;
            assert!(principal.is_none());
            assert_eq!(
                gate.check("", None, Some(&guess)).await,
                Err(Denial::Unauthenticated)
            );
        }

        let throttling = CacheThrottlingStore::new(Arc::clone(&cache), config.throttling.clone());
        let fingerprint = PartitionKeyBuilder::new(ShortHasher::new(&config.crypto)).fingerprint_hash("fp1");
        let state = throttling
            .failure_state(Partition::Fingerprint, &fingerprint)
            .await
            .unwrap();
        assert!(state.is_locked_at(chrono::Utc::now()));

        // A genuine session from the locked device is refused too.
        let sessions = CachedSessionStore::new(cache);
        let id = sessions
            .create_session("fp1", Duration::from_secs(300))
            .await
            .unwrap();
        let genuine = RequestContext::new()
            .with_header("X-Session-Id", &id)
            .with_header("X-FingerPrint", "fp1");
        let principal = gate.authenticate(&genuine).await.principal;
        assert!(principal.is_some());
        assert_eq!(
            gate.check("", principal.as_ref(), Some(&genuine)).await,
            Err(Denial::Unauthenticated)
        );
    }
}
