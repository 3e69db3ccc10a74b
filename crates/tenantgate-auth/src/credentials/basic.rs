//! HTTP Basic credentials for service accounts.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use tenantgate_core::config::AuthConfig;
use tenantgate_core::types::{ClaimType, Principal, RequestContext, SchemeKind, headers};

use super::{ResolveOutcome, strip_scheme};
use crate::crypto::compare::constant_time_str_eq;
use crate::outcome::AuthFailure;

const SCHEME: SchemeKind = SchemeKind::Basic;

pub fn resolve(config: &AuthConfig, request: &RequestContext) -> ResolveOutcome {
    let Some(encoded) = request
        .header(headers::AUTHORIZATION)
        .and_then(|v| strip_scheme(v, headers::BASIC_PREFIX))
        .map(str::trim)
    else {
        return ResolveOutcome::NoOpinion;
    };

    let Some(expected) = config.basic.as_ref() else {
        return ResolveOutcome::fail(
            SCHEME,
            AuthFailure::ServerMisconfigured,
            "basic credentials are not configured",
        );
    };

    let Some((username, password)) = decode_pair(encoded) else {
        return ResolveOutcome::fail(
            SCHEME,
            AuthFailure::CredentialInvalid,
            "malformed basic credentials",
        );
    };

    // Both comparisons always run.
    let user_ok = constant_time_str_eq(&username, &expected.username);
    let password_ok = constant_time_str_eq(&password, &expected.password);
    if !(user_ok & password_ok) {
        return ResolveOutcome::fail(
            SCHEME,
            AuthFailure::CredentialInvalid,
            "basic credentials mismatch",
        );
    }

    ResolveOutcome::Success(
        Principal::builder(SCHEME)
            .claim(ClaimType::Name, username)
            .build(),
    )
}

fn decode_pair(encoded: &str) -> Option<(String, String)> {
    let raw = BASE64.decode(encoded.as_bytes()).ok()?;
    let text = String::from_utf8(raw).ok()?;
    let (user, password) = text.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}
