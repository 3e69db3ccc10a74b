//! Permission gate backed by the identity service.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use tenantgate_core::config::AuthConfig;
use tenantgate_core::traits::IdentityService;
use tenantgate_core::types::{Principal, RequestContext, SchemeKind, headers};

use crate::outcome::{AuthFailure, EvaluationFailure, RequirementKind};
use crate::policy::{PermissionRequirement, Requirement};

fn fail(reason: AuthFailure, detail: impl Into<String>) -> Result<(), EvaluationFailure> {
    Err(EvaluationFailure::new(RequirementKind::Permission, reason, detail))
}

/// `jointly` holds every requirement evaluated for the same request; a
/// super admin is only waved through when none of them is super-admin-only.
pub async fn evaluate(
    config: &AuthConfig,
    identity: &dyn IdentityService,
    requirement: &PermissionRequirement,
    jointly: &[Requirement],
    principal: &Principal,
    request: Option<&RequestContext>,
) -> Result<(), EvaluationFailure> {
    if requirement.is_empty() {
        return Ok(());
    }
    let super_admin = principal.is_super_admin();
    if super_admin && !jointly.contains(&Requirement::SuperAdmin) {
        return Ok(());
    }
    if principal.scheme() == SchemeKind::Session {
        return Ok(());
    }

    let office_id = if super_admin {
        config.default_office_id
    } else {
        request
            .and_then(|r| r.route_or_query(headers::OFFICE_ID))
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(config.default_office_id)
    };
    let user_id = principal.user_id();

    let cancel = request
        .map(|r| r.cancellation().clone())
        .unwrap_or_else(CancellationToken::new);
    match identity.get_user_permissions(user_id, office_id, &cancel).await {
        Ok(granted) if requirement.is_satisfied_by(&granted) => Ok(()),
        Ok(_) => {
            debug!(?user_id, office_id, required = ?requirement.permissions(), "Permission denied");
            fail(
                AuthFailure::PermissionDenied,
                format!("none of {:?} granted in office {office_id}", requirement.permissions()),
            )
        }
        Err(e) => {
            error!(?user_id, office_id, error = %e, "Permission lookup failed");
            fail(
                AuthFailure::UpstreamLookupError,
                format!("permission lookup failed: {e}"),
            )
        }
    }
}
