//! The four requirement evaluators and the dispatcher that runs a policy's
//! requirements for one request.

pub mod office_user;
pub mod permission;
pub mod session;
pub mod super_admin;

use std::sync::Arc;

use futures::future::join_all;
use tracing::info;

use tenantgate_core::config::AuthConfig;
use tenantgate_core::traits::IdentityService;
use tenantgate_core::types::{Principal, RequestContext};

use crate::outcome::{AuthFailure, AuthorizationOutcome, EvaluationFailure};
use crate::policy::Requirement;

pub use session::SessionCheck;

/// Evaluates requirements against a principal and request.
#[derive(Debug, Clone)]
pub struct RequirementEvaluator {
    config: Arc<AuthConfig>,
    identity: Arc<dyn IdentityService>,
    session: SessionCheck,
}

impl RequirementEvaluator {
    pub fn new(config: Arc<AuthConfig>, identity: Arc<dyn IdentityService>, session: SessionCheck) -> Self {
        Self {
            config,
            identity,
            session,
        }
    }

    /// Runs one requirement. `jointly` is every requirement evaluated for
    /// the same request.
    pub async fn evaluate_one(
        &self,
        requirement: &Requirement,
        jointly: &[Requirement],
        principal: &Principal,
        request: Option<&RequestContext>,
    ) -> Result<(), EvaluationFailure> {
        match requirement {
            Requirement::SuperAdmin => super_admin::evaluate(principal),
            Requirement::OfficeUser => {
                office_user::evaluate(&self.config, self.identity.as_ref(), principal, request).await
            }
            Requirement::Permission(permissions) => {
                permission::evaluate(
                    &self.config,
                    self.identity.as_ref(),
                    permissions,
                    jointly,
                    principal,
                    request,
                )
                .await
            }
            Requirement::Session => self.session.evaluate(Some(principal), request).await,
        }
    }

    /// Runs every requirement; all must pass.
    ///
    /// Requirements are independent and run concurrently. An anonymous
    /// caller always fails: only its session requirements are evaluated,
    /// so that failed session guesses reach the throttling store, and every
    /// other requirement fails without any lookup.
    pub async fn evaluate(
        &self,
        requirements: &[Requirement],
        principal: Option<&Principal>,
        request: Option<&RequestContext>,
    ) -> AuthorizationOutcome {
        let Some(principal) = principal else {
            return self.evaluate_anonymous(requirements, request).await;
        };

        let results = join_all(
            requirements
                .iter()
                .map(|requirement| self.evaluate_one(requirement, requirements, principal, request)),
        )
        .await;

        let failures: Vec<EvaluationFailure> = results.into_iter().filter_map(Result::err).collect();
        if failures.is_empty() {
            return AuthorizationOutcome::Succeeded;
        }

        for failure in &failures {
            info!(
                requirement = %failure.kind,
                reason = %failure.reason,
                detail = %failure.detail,
                scheme = %principal.scheme(),
                user_id = ?principal.user_id(),
                session_id = ?principal.session_id(),
                "Requirement failed"
            );
        }
        AuthorizationOutcome::Failed(failures)
    }

    async fn evaluate_anonymous(
        &self,
        requirements: &[Requirement],
        request: Option<&RequestContext>,
    ) -> AuthorizationOutcome {
        if requirements.is_empty() {
            return AuthorizationOutcome::Succeeded;
        }

        let results = join_all(requirements.iter().map(|requirement| async move {
            let failure = match requirement {
                Requirement::Session => self.session.evaluate(None, request).await.err(),
                _ => None,
            };
            failure.unwrap_or_else(|| {
                EvaluationFailure::new(requirement.kind(), AuthFailure::NotAuthenticated, "anonymous caller")
            })
        }))
        .await;

        for failure in &results {
            info!(
                requirement = %failure.kind,
                reason = %failure.reason,
                detail = %failure.detail,
                "Requirement failed for anonymous caller"
            );
        }
        AuthorizationOutcome::Failed(results)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{CountingSessions, FakeIdentity, throttling_store};
    use super::*;
    use crate::outcome::RequirementKind;
    use crate::policy::PermissionRequirement;
    use crate::throttling::PartitionKeyBuilder;
    use tenantgate_core::types::{ClaimType, SchemeKind};

    fn evaluator(identity: FakeIdentity) -> RequirementEvaluator {
        RequirementEvaluator::new(
            Arc::new(AuthConfig::default()),
            Arc::new(identity),
            SessionCheck::new(
                Arc::new(CountingSessions::valid(false)),
                throttling_store(5),
                PartitionKeyBuilder::default(),
            ),
        )
    }

    #[tokio::test]
    async fn test_all_failures_are_collected() {
        let evaluator = evaluator(FakeIdentity::default());
        let principal = Principal::builder(SchemeKind::Bearer)
            .claim(ClaimType::UserId, "3")
            .build();
        let requirements = [
            Requirement::SuperAdmin,
            Requirement::Permission(PermissionRequirement::parse("X")),
            Requirement::Session,
        ];
        let outcome = evaluator
            .evaluate(&requirements, Some(&principal), Some(&RequestContext::new()))
            .await;
        let kinds: Vec<RequirementKind> = outcome.failures().iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![RequirementKind::SuperAdmin, RequirementKind::Permission, RequirementKind::Session]
        );
    }

    #[tokio::test]
    async fn test_empty_permission_requirement_passes() {
        let evaluator = evaluator(FakeIdentity::failing());
        let principal = Principal::builder(SchemeKind::Bearer)
            .claim(ClaimType::UserId, "3")
            .build();
        let requirements = [Requirement::Permission(PermissionRequirement::default())];
        let outcome = evaluator
            .evaluate(&requirements, Some(&principal), Some(&RequestContext::new()))
            .await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_anonymous_caller_fails_without_lookups() {
        let evaluator = evaluator(FakeIdentity::default());
        let requirements = [Requirement::Permission(PermissionRequirement::default())];
        let outcome = evaluator.evaluate(&requirements, None, None).await;
        assert_eq!(outcome.failures()[0].reason, AuthFailure::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_anonymous_caller_runs_session_check_but_never_passes() {
        let sessions = Arc::new(CountingSessions::valid(true));
        let evaluator = RequirementEvaluator::new(
            Arc::new(AuthConfig::default()),
            Arc::new(FakeIdentity::default()),
            SessionCheck::new(sessions.clone(), throttling_store(5), PartitionKeyBuilder::default()),
        );
        let requirements = [
            Requirement::Permission(PermissionRequirement::default()),
            Requirement::Session,
        ];
        let request = RequestContext::new()
            .with_header("X-Session-Id", "abc")
            .with_header("X-FingerPrint", "fp1");

        let outcome = evaluator.evaluate(&requirements, None, Some(&request)).await;
        assert!(!outcome.is_success());
        assert_eq!(sessions.calls(), 1);
        assert!(
            outcome
                .failures()
                .iter()
                .all(|f| f.reason == AuthFailure::NotAuthenticated)
        );

        sessions.set_valid(false);
        let outcome = evaluator.evaluate(&requirements, None, Some(&request)).await;
        let session = outcome
            .failures()
            .iter()
            .find(|f| f.kind == RequirementKind::Session)
            .unwrap();
        assert_eq!(session.reason, AuthFailure::SessionInvalid);
    }
}
