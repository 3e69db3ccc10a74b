//! Office-membership gate.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use tenantgate_core::config::AuthConfig;
use tenantgate_core::traits::IdentityService;
use tenantgate_core::types::{Principal, RequestContext, SchemeKind, headers};

use crate::outcome::{AuthFailure, EvaluationFailure, RequirementKind};

fn fail(reason: AuthFailure, detail: impl Into<String>) -> Result<(), EvaluationFailure> {
    Err(EvaluationFailure::new(RequirementKind::OfficeUser, reason, detail))
}

pub async fn evaluate(
    config: &AuthConfig,
    identity: &dyn IdentityService,
    principal: &Principal,
    request: Option<&RequestContext>,
) -> Result<(), EvaluationFailure> {
    if request
        .and_then(RequestContext::operation)
        .is_some_and(|op| config.is_bootstrap_operation(op))
    {
        return Ok(());
    }

    if matches!(principal.scheme(), SchemeKind::Session | SchemeKind::ApiKey) {
        return Ok(());
    }

    let Some(raw) = request
        .and_then(|r| r.route_or_query(headers::OFFICE_ID))
        .map(str::trim)
        .filter(|v| !v.is_empty())
    else {
        return Ok(());
    };

    let office_id = match raw.parse::<i64>() {
        Ok(id) => id,
        Err(_) if enables_office(raw, request) => return Ok(()),
        Err(_) => return fail(AuthFailure::OfficeNotFound, format!("malformed office id {raw}")),
    };

    if principal.is_super_admin() || principal.is_member_of(office_id) {
        return Ok(());
    }

    // Service-to-service caller with nothing to check against.
    if !principal.has_office_claim() && principal.user_id().is_none() {
        return Ok(());
    }

    let cancel = request
        .map(|r| r.cancellation().clone())
        .unwrap_or_else(CancellationToken::new);
    match identity
        .validate_office_membership(principal, office_id, &cancel)
        .await
    {
        Ok(true) => Ok(()),
        Ok(false) => {
            debug!(office_id, user_id = ?principal.user_id(), "Office membership denied");
            fail(
                AuthFailure::NotOfficeMember,
                format!("not a member of office {office_id}"),
            )
        }
        Err(e) => {
            error!(office_id, user_id = ?principal.user_id(), error = %e, "Office membership lookup failed");
            fail(
                AuthFailure::UpstreamLookupError,
                format!("membership lookup failed: {e}"),
            )
        }
    }
}

/// The `enableOffice` marker, either as the office value itself or as its
/// own route value.
///
/// The marker names no concrete office, so there is nothing for the
/// super-admin, claim or lookup steps to check. It passes the gate outright
/// and the endpoint enforces its own rules for enabling an office.
fn enables_office(raw: &str, request: Option<&RequestContext>) -> bool {
    raw.eq_ignore_ascii_case(headers::ENABLE_OFFICE)
        || request.is_some_and(|r| r.route(headers::ENABLE_OFFICE).is_some())
}
