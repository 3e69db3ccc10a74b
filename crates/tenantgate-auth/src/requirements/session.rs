//! Session binding check with partitioned failure throttling.
//!
//! States, in order: no request context fails; client-credentials bearer
//! tokens and API-key callers pass; an anonymous caller is checked like
//! any other so failed session-id guesses are counted; missing session or fingerprint headers
//! fail; a lock on any partition fails without validating or counting;
//! otherwise the session is validated, clearing failures on success and
//! registering one on every partition on failure.

use std::sync::Arc;

use tracing::{error, info, warn};

use tenantgate_core::traits::{SessionStore, ThrottlingStore};
use tenantgate_core::types::{Principal, RequestContext, SchemeKind, ThrottlingContext, headers};

use crate::outcome::{AuthFailure, EvaluationFailure, RequirementKind};
use crate::throttling::PartitionKeyBuilder;

fn fail(reason: AuthFailure, detail: impl Into<String>) -> Result<(), EvaluationFailure> {
    Err(EvaluationFailure::new(RequirementKind::Session, reason, detail))
}

/// Validates session binding and drives the throttling store.
#[derive(Debug, Clone)]
pub struct SessionCheck {
    sessions: Arc<dyn SessionStore>,
    throttling: Arc<dyn ThrottlingStore>,
    keys: PartitionKeyBuilder,
}

impl SessionCheck {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        throttling: Arc<dyn ThrottlingStore>,
        keys: PartitionKeyBuilder,
    ) -> Self {
        Self {
            sessions,
            throttling,
            keys,
        }
    }

    /// `principal` is `None` when no credential resolved, e.g. an unknown
    /// session id. Such calls are still throttled.
    pub async fn evaluate(
        &self,
        principal: Option<&Principal>,
        request: Option<&RequestContext>,
    ) -> Result<(), EvaluationFailure> {
        let Some(request) = request else {
            return fail(AuthFailure::NoContext, "no request context");
        };

        if principal.is_some_and(|p| p.is_client_credentials() || p.scheme() == SchemeKind::ApiKey) {
            return Ok(());
        }

        let (Some(session_id), Some(fingerprint)) = (
            request.non_empty_header(headers::SESSION_ID),
            request.non_empty_header(headers::FINGERPRINT),
        ) else {
            return fail(
                AuthFailure::SessionHeadersMissing,
                "X-Session-Id and X-FingerPrint are required",
            );
        };

        let context = self.keys.build(principal, request, fingerprint);
        let cancel = request.cancellation();
        let user_id = principal.and_then(Principal::user_id);
        let fingerprint_hash = context.fingerprint_key.as_str();

        match self.throttling.is_locked(&context, cancel).await {
            Ok(false) => {}
            Ok(true) => {
                warn!(?user_id, session_id, fingerprint_hash, "Session validation blocked by lock");
                return fail(AuthFailure::PartitionLocked, "a throttling partition is locked");
            }
            Err(e) => {
                error!(?user_id, session_id, fingerprint_hash, error = %e, "Lock check failed");
                return fail(
                    AuthFailure::UpstreamLookupError,
                    format!("lock check failed: {e}"),
                );
            }
        }

        let valid = match principal.and_then(Principal::external_id) {
            Some(external_id) => {
                self.sessions
                    .is_user_valid(session_id, external_id, fingerprint, cancel)
                    .await
            }
            None => self.sessions.is_valid(session_id, fingerprint, cancel).await,
        };
        let valid = valid.unwrap_or_else(|e| {
            error!(?user_id, session_id, fingerprint_hash, error = %e, "Session validation failed");
            false
        });

        if valid {
            self.clear(&context, request).await;
            return Ok(());
        }

        info!(?user_id, session_id, fingerprint_hash, "Session rejected");
        self.register_failure(&context, request).await;
        fail(
            AuthFailure::SessionInvalid,
            format!("session {session_id} is not valid for this caller"),
        )
    }

    async fn clear(&self, context: &ThrottlingContext, request: &RequestContext) {
        if let Err(e) = self.throttling.clear(context, request.cancellation()).await {
            warn!(error = %e, "Failed to clear throttling state");
        }
    }

    async fn register_failure(&self, context: &ThrottlingContext, request: &RequestContext) {
        if let Err(e) = self
            .throttling
            .register_failure(context, request.cancellation())
            .await
        {
            error!(error = %e, "Failed to register session failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::test_support::{CountingSessions, throttling_store};
    use tenantgate_core::types::{CLIENT_CREDENTIALS, ClaimType};

    fn check(sessions: Arc<CountingSessions>, max_failures: u32) -> SessionCheck {
        SessionCheck::new(
            sessions,
            throttling_store(max_failures),
            PartitionKeyBuilder::default(),
        )
    }

    fn request(session: &str, fingerprint: &str) -> RequestContext {
        RequestContext::new()
            .with_header("X-Session-Id", session)
            .with_header("X-FingerPrint", fingerprint)
            .with_header("User-Agent", "agent")
    }

    fn anonymous_session() -> Principal {
        Principal::builder(SchemeKind::Session)
            .claim(ClaimType::SessionId, "abc")
            .build()
    }

    #[tokio::test]
    async fn test_missing_context_and_headers_fail() {
        let check = check(Arc::new(CountingSessions::valid(false)), 5);
        let err = check.evaluate(Some(&anonymous_session()), None).await.unwrap_err();
        assert_eq!(err.reason, AuthFailure::NoContext);

        let only_session = RequestContext::new().with_header("X-Session-Id", "abc");
        let err = check
            .evaluate(Some(&anonymous_session()), Some(&only_session))
            .await
            .unwrap_err();
        assert_eq!(err.reason, AuthFailure::SessionHeadersMissing);
    }

    #[tokio::test]
    async fn test_service_callers_bypass() {
        let sessions = Arc::new(CountingSessions::valid(false));
        let check = check(sessions.clone(), 5);
        let service = Principal::builder(SchemeKind::Bearer)
            .claim(ClaimType::GrantType, CLIENT_CREDENTIALS)
            .build();
        let api = Principal::builder(SchemeKind::ApiKey).build();
        let empty = RequestContext::new();

        assert!(check.evaluate(Some(&service), Some(&empty)).await.is_ok());
        assert!(check.evaluate(Some(&api), Some(&empty)).await.is_ok());
        assert_eq!(sessions.calls(), 0);
    }

    #[tokio::test]
    async fn test_user_principal_uses_user_binding() {
        let sessions = Arc::new(CountingSessions::valid(true));
        let check = check(sessions.clone(), 5);
        let user = Principal::builder(SchemeKind::Bearer)
            .claim(ClaimType::ExternalId, "oid-9")
            .build();
        assert!(check.evaluate(Some(&user), Some(&request("abc", "fp1"))).await.is_ok());
        assert_eq!(sessions.last_user().as_deref(), Some("oid-9"));
    }

    #[tokio::test]
    async fn test_lock_blocks_validation_after_threshold() {
        let sessions = Arc::new(CountingSessions::valid(false));
        let check = check(sessions.clone(), 5);
        let req = request("abc", "fp1");

        for _ in 0..5 {
            let err = check.evaluate(Some(&anonymous_session()), Some(&req)).await.unwrap_err();
            assert_eq!(err.reason, AuthFailure::SessionInvalid);
        }
        assert_eq!(sessions.calls(), 5);

        // The session is valid now, but the lock is checked first.
        sessions.set_valid(true);
        let err = check.evaluate(Some(&anonymous_session()), Some(&req)).await.unwrap_err();
        assert_eq!(err.reason, AuthFailure::PartitionLocked);
        assert_eq!(sessions.calls(), 5);
    }

    #[tokio::test]
    async fn test_success_clears_failures() {
        let sessions = Arc::new(CountingSessions::valid(false));
        let check = check(sessions.clone(), 3);
        let req = request("abc", "fp1");

        for _ in 0..2 {
            assert!(check.evaluate(Some(&anonymous_session()), Some(&req)).await.is_err());
        }
        sessions.set_valid(true);
        assert!(check.evaluate(Some(&anonymous_session()), Some(&req)).await.is_ok());

        // Two more failures stay below the threshold of three after clearing.
        sessions.set_valid(false);
        for _ in 0..2 {
            let err = check.evaluate(Some(&anonymous_session()), Some(&req)).await.unwrap_err();
            assert_eq!(err.reason, AuthFailure::SessionInvalid);
        }
    }

    #[tokio::test]
    async fn test_store_error_counts_as_failure() {
        let sessions = Arc::new(CountingSessions::erroring());
        let check = check(sessions, 5);
        let err = check
            .evaluate(Some(&anonymous_session()), Some(&request("abc", "fp1")))
            .await
            .unwrap_err();
        assert_eq!(err.reason, AuthFailure::SessionInvalid);
    }

    #[tokio::test]
    async fn test_anonymous_guesses_are_throttled() {
        let sessions = Arc::new(CountingSessions::valid(false));
        let check = check(sessions.clone(), 5);

        for i in 0..5 {
            let req = request(&format!("guess-{i}"), "fp1");
            let err = check.evaluate(None, Some(&req)).await.unwrap_err();
            assert_eq!(err.reason, AuthFailure::SessionInvalid);
        }

        // A real session from the same device is refused while locked.
        sessions.set_valid(true);
        let err = check
            .evaluate(Some(&anonymous_session()), Some(&request("abc", "fp1")))
            .await
            .unwrap_err();
        assert_eq!(err.reason, AuthFailure::PartitionLocked);
        assert_eq!(sessions.calls(), 5);
    }

    #[tokio::test]
    async fn test_anonymous_caller_without_headers_fails() {
        let check = check(Arc::new(CountingSessions::valid(true)), 5);
        let err = check
            .evaluate(None, Some(&RequestContext::new()))
            .await
            .unwrap_err();
        assert_eq!(err.reason, AuthFailure::SessionHeadersMissing);
    }
}
