//! Failure taxonomy, authorization outcomes, and the mapping from a failed
//! outcome to what the caller is told.

use std::fmt;

use serde::Serialize;

/// Why a credential or requirement check failed.
///
/// These reasons are for logs only. Callers only ever see a [`Denial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailure {
    #[error("credential missing")]
    CredentialMissing,
    #[error("credential invalid")]
    CredentialInvalid,
    #[error("server misconfigured")]
    ServerMisconfigured,
    #[error("no request context")]
    NoContext,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("session headers missing")]
    SessionHeadersMissing,
    #[error("session invalid")]
    SessionInvalid,
    #[error("partition locked")]
    PartitionLocked,
    #[error("office not found")]
    OfficeNotFound,
    #[error("not a member of the office")]
    NotOfficeMember,
    #[error("not a super admin")]
    NotSuperAdmin,
    #[error("permission denied")]
    PermissionDenied,
    #[error("upstream lookup failed")]
    UpstreamLookupError,
}

/// The four requirement evaluators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RequirementKind {
    SuperAdmin,
    OfficeUser,
    Permission,
    Session,
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::OfficeUser => write!(f, "office_user"),
            Self::Permission => write!(f, "permission"),
            Self::Session => write!(f, "session"),
        }
    }
}

/// One failed requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationFailure {
    /// Evaluator that failed.
    pub kind: RequirementKind,
    /// Categorised reason.
    pub reason: AuthFailure,
    /// Diagnostic detail, never sent to the caller.
    pub detail: String,
}

impl EvaluationFailure {
    pub fn new(kind: RequirementKind, reason: AuthFailure, detail: impl Into<String>) -> Self {
        Self {
            kind,
            reason,
            detail: detail.into(),
        }
    }
}

/// Result of evaluating every requirement of a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Succeeded,
    Failed(Vec<EvaluationFailure>),
}

impl AuthorizationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn failures(&self) -> &[EvaluationFailure] {
        match self {
            Self::Succeeded => &[],
            Self::Failed(failures) => failures,
        }
    }
}

/// What the caller is told when a request is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    /// Credentials or session must be (re)established.
    Unauthenticated,
    /// Authenticated, but not allowed.
    Forbidden,
    /// Generic refusal.
    Denied,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// Picks the caller-visible denial for an outcome.
///
/// An anonymous caller is always told to authenticate. Otherwise a failed
/// session requirement wins over everything, then permission and office
/// failures map to forbidden, and anything else is a generic denial.
pub fn map_outcome(outcome: &AuthorizationOutcome, authenticated: bool) -> Option<Denial> {
    let failures = match outcome {
        AuthorizationOutcome::Succeeded => return None,
        AuthorizationOutcome::Failed(failures) => failures,
    };

    if !authenticated {
        return Some(Denial::Unauthenticated);
    }
    let failed = |kind: RequirementKind| failures.iter().any(|f| f.kind == kind);
    if failed(RequirementKind::Session) {
        Some(Denial::Unauthenticated)
    } else if failed(RequirementKind::Permission) || failed(RequirementKind::OfficeUser) {
        Some(Denial::Forbidden)
    } else {
        Some(Denial::Denied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(kinds: &[RequirementKind]) -> AuthorizationOutcome {
        AuthorizationOutcome::Failed(
            kinds
                .iter()
                .map(|k| EvaluationFailure::new(*k, AuthFailure::PermissionDenied, "x"))
                .collect(),
        )
    }

    #[test]
    fn test_success_maps_to_none() {
        assert_eq!(map_outcome(&AuthorizationOutcome::Succeeded, true), None);
        assert_eq!(map_outcome(&AuthorizationOutcome::Succeeded, false), None);
    }

    #[test]
    fn test_session_failure_is_unauthenticated() {
        let outcome = failed(&[RequirementKind::Permission, RequirementKind::Session]);
        assert_eq!(map_outcome(&outcome, true), Some(Denial::Unauthenticated));
    }

    #[test]
    fn test_permission_and_office_failures_are_forbidden() {
        assert_eq!(
            map_outcome(&failed(&[RequirementKind::Permission]), true),
            Some(Denial::Forbidden)
        );
        assert_eq!(
            map_outcome(&failed(&[RequirementKind::OfficeUser]), true),
            Some(Denial::Forbidden)
        );
    }

    #[test]
    fn test_other_failures_are_generic() {
        assert_eq!(
            map_outcome(&failed(&[RequirementKind::SuperAdmin]), true),
            Some(Denial::Denied)
        );
    }

    #[test]
    fn test_anonymous_caller_is_unauthenticated() {
        assert_eq!(
            map_outcome(&failed(&[RequirementKind::Permission]), false),
            Some(Denial::Unauthenticated)
        );
    }
}
