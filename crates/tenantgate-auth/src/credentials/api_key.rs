//! Static API key in `X-API-Key`, header first, then query string.

use tenantgate_core::config::AuthConfig;
use tenantgate_core::types::{API_CLIENT_NAME, ClaimType, Principal, RequestContext, SchemeKind, headers};

use super::ResolveOutcome;
use crate::crypto::compare::constant_time_str_eq;
use crate::outcome::AuthFailure;

const SCHEME: SchemeKind = SchemeKind::ApiKey;

pub fn resolve(config: &AuthConfig, request: &RequestContext) -> ResolveOutcome {
    let provided = request.non_empty_header(headers::API_KEY).or_else(|| {
        request
            .query(headers::API_KEY_QUERY)
            .filter(|v| !v.trim().is_empty())
    });
    let Some(provided) = provided else {
        return ResolveOutcome::fail(
            SCHEME,
            AuthFailure::CredentialMissing,
            "X-API-Key header and query parameter are missing",
        );
    };

    let Some(expected) = config.api_key.as_deref().filter(|k| !k.is_empty()) else {
        return ResolveOutcome::fail(
            SCHEME,
            AuthFailure::ServerMisconfigured,
            "server API key is not configured",
        );
    };

    if !constant_time_str_eq(provided, expected) {
        return ResolveOutcome::fail(SCHEME, AuthFailure::CredentialInvalid, "API key mismatch");
    }

    let office_id = request
        .route_or_query(headers::OFFICE_ID)
        .and_then(|v| v.trim().parse::<i64>().ok());

    ResolveOutcome::Success(
        Principal::builder(SCHEME)
            .claim(ClaimType::Name, API_CLIENT_NAME)
            .claim_opt(ClaimType::OfficeId, office_id.map(|id| id.to_string()))
            .build(),
    )
}
