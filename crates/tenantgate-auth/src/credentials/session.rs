//! Opaque session id in `X-Session-Id`.
//!
//! Only existence is checked here. Binding to a fingerprint and user is
//! enforced by the session requirement.

use tenantgate_core::traits::SessionStore;
use tenantgate_core::types::{ClaimType, Principal, RequestContext, SESSION_USER_NAME, SchemeKind, headers};

use super::ResolveOutcome;
use crate::outcome::AuthFailure;

const SCHEME: SchemeKind = SchemeKind::Session;

pub async fn resolve(store: &dyn SessionStore, request: &RequestContext) -> ResolveOutcome {
    let Some(session_id) = request.non_empty_header(headers::SESSION_ID) else {
        return ResolveOutcome::fail(
            SCHEME,
            AuthFailure::CredentialMissing,
            "X-Session-Id header is missing",
        );
    };

    match store
        .is_valid_session_id(session_id, request.cancellation())
        .await
    {
        Ok(true) => ResolveOutcome::Success(
            Principal::builder(SCHEME)
                .claim(ClaimType::Name, SESSION_USER_NAME)
                .claim(ClaimType::SessionId, session_id)
                .build(),
        ),
        Ok(false) => ResolveOutcome::fail(
            SCHEME,
            AuthFailure::CredentialInvalid,
            format!("session {session_id} does not exist"),
        ),
        Err(e) => ResolveOutcome::fail(
            SCHEME,
            AuthFailure::UpstreamLookupError,
            format!("session lookup failed: {e}"),
        ),
    }
}
