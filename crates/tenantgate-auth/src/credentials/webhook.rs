//! Per-lender webhook keys in `Authorization: WebHookApiKey <key>`.
//!
//! Only routes carrying a `lenderCode` value accept this scheme.

use tenantgate_core::config::AuthConfig;
use tenantgate_core::types::{ClaimType, Principal, RequestContext, SchemeKind, headers};

use super::{ResolveOutcome, strip_scheme};
use crate::crypto::compare::constant_time_str_eq;
use crate::outcome::AuthFailure;

const SCHEME: SchemeKind = SchemeKind::Webhook;

pub fn resolve(config: &AuthConfig, request: &RequestContext) -> ResolveOutcome {
    let Some(provided) = request
        .header(headers::AUTHORIZATION)
        .and_then(|v| strip_scheme(v, headers::WEBHOOK_PREFIX))
        .map(str::trim)
    else {
        return ResolveOutcome::NoOpinion;
    };
    let Some(lender_code) = request
        .route(headers::LENDER_CODE)
        .filter(|v| !v.trim().is_empty())
    else {
        return ResolveOutcome::NoOpinion;
    };

    if provided.is_empty() {
        return ResolveOutcome::fail(SCHEME, AuthFailure::CredentialMissing, "webhook key is empty");
    }
    if config.webhook_keys.is_empty() {
        return ResolveOutcome::fail(
            SCHEME,
            AuthFailure::ServerMisconfigured,
            "no webhook keys are configured",
        );
    }
    let Some(expected) = config.webhook_key(lender_code) else {
        return ResolveOutcome::fail(
            SCHEME,
            AuthFailure::CredentialInvalid,
            format!("unrecognized lender code {lender_code}"),
        );
    };
    if !constant_time_str_eq(provided, expected) {
        return ResolveOutcome::fail(
            SCHEME,
            AuthFailure::CredentialInvalid,
            format!("webhook key mismatch for {lender_code}"),
        );
    }

    ResolveOutcome::Success(
        Principal::builder(SCHEME)
            .claim(ClaimType::Name, lender_code)
            .claim(ClaimType::Scheme, SCHEME.to_string())
            .build(),
    )
}
