//! Resolves the caller once per request.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::extractors::{CurrentPrincipal, request_context};
use crate::state::AuthState;

/// Runs the credential resolvers and stores the outcome in request
/// extensions as [`CurrentPrincipal`] plus the built `RequestContext`.
///
/// The principal is also copied onto the response for outer layers such
/// as [`request_logging`](super::request_logging). Never rejects; anonymous requests continue and are denied by policy.
/// Collaborator calls made for this request are cancelled if the client
/// goes away before the response is produced.
pub async fn authenticate(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let (mut parts, body) = request.into_parts();
    let ctx = request_context(&mut parts, cancel).await;
    let authentication = state.gate.authenticate(&ctx).await;

    match &authentication.principal {
        Some(principal) => debug!(
            scheme = %principal.scheme(),
            name = principal.name().unwrap_or_default(),
            "Request authenticated"
        ),
        None => debug!(
            failures = authentication.failures.len(),
            "Request is anonymous"
        ),
    }

    let current = CurrentPrincipal(authentication.principal);
    parts.extensions.insert(current.clone());
    parts.extensions.insert(ctx);

    let mut response = next.run(Request::from_parts(parts, body)).await;
    response.extensions_mut().insert(current);
    response
}
