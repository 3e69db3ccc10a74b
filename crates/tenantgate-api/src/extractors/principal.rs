//! Principal extractors for handlers behind the authenticate layer.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use tenantgate_auth::Denial;
use tenantgate_core::types::Principal;

use crate::error::DenialResponse;

/// The caller resolved by the authenticate layer; `None` when anonymous.
#[derive(Debug, Clone, Default)]
pub struct CurrentPrincipal(pub Option<Principal>);

/// An authenticated caller. Rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl std::ops::Deref for Authenticated {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = DenialResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentPrincipal>()
            .and_then(|current| current.0.clone())
            .map(Authenticated)
            .ok_or(DenialResponse(Denial::Unauthenticated))
    }
}
