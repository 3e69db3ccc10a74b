//! Signed bearer tokens in `Authorization: Bearer <token>`.

use tenantgate_core::error::ErrorKind;
use tenantgate_core::traits::TokenValidator;
use tenantgate_core::types::{ClaimType, Principal, RequestContext, SchemeKind, TokenClaims, headers};

use super::{ResolveOutcome, strip_scheme};
use crate::outcome::AuthFailure;

const SCHEME: SchemeKind = SchemeKind::Bearer;

pub async fn resolve(validator: Option<&dyn TokenValidator>, request: &RequestContext) -> ResolveOutcome {
    let Some(token) = request
        .header(headers::AUTHORIZATION)
        .and_then(|v| strip_scheme(v, headers::BEARER_PREFIX))
        .map(str::trim)
    else {
        return ResolveOutcome::NoOpinion;
    };
    if token.is_empty() {
        return ResolveOutcome::fail(SCHEME, AuthFailure::CredentialMissing, "bearer token is empty");
    }

    let Some(validator) = validator else {
        return ResolveOutcome::fail(
            SCHEME,
            AuthFailure::ServerMisconfigured,
            "bearer token validation is not configured",
        );
    };

    match validator.validate(token, request.cancellation()).await {
        Ok(claims) => ResolveOutcome::Success(principal_from_claims(&claims)),
        Err(e) if e.kind == ErrorKind::Authentication => {
            ResolveOutcome::fail(SCHEME, AuthFailure::CredentialInvalid, e.message)
        }
        Err(e) => ResolveOutcome::fail(
            SCHEME,
            AuthFailure::UpstreamLookupError,
            format!("token validation failed: {e}"),
        ),
    }
}

/// Builds the principal for validated claims, promoting the
/// `officePermissions` and `officeRole` extension claims to roles.
pub fn principal_from_claims(claims: &TokenClaims) -> Principal {
    let name = claims.name.as_deref().unwrap_or(&claims.sub);

    Principal::builder(SCHEME)
        .claim(ClaimType::Name, name)
        .claim_opt(ClaimType::ExternalId, claims.oid.as_deref())
        .claim_opt(ClaimType::UserId, claims.uid.map(|id| id.to_string()))
        .claims(ClaimType::OfficeId, claims.office_ids.iter().map(i64::to_string))
        .claims(ClaimType::Role, claims.roles.iter().map(String::as_str))
        .claims(ClaimType::Role, claims.office_permissions.iter().map(String::as_str))
        .claim_opt(ClaimType::Role, claims.office_role.as_deref())
        .claim_opt(ClaimType::SuperAdmin, claims.is_super_admin.then_some("true"))
        .claim_opt(ClaimType::GrantType, claims.grant_type.as_deref())
        .build()
}
