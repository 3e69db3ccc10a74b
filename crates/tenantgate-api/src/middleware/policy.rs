//! Per-route policy enforcement.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio_util::sync::CancellationToken;
use tracing::info;

use tenantgate_auth::AuthGate;
use tenantgate_core::types::RequestContext;

use crate::error::DenialResponse;
use crate::extractors::{CurrentPrincipal, request_context};
use crate::state::AuthState;

/// State for [`enforce_policy`]: the gate plus the policy name a route
/// requires. An empty name only requires an authenticated caller.
#[derive(Debug, Clone)]
pub struct PolicyGuard {
    gate: Arc<AuthGate>,
    policy: Arc<str>,
}

impl PolicyGuard {
    pub fn new(state: &AuthState, policy: &str) -> Self {
        Self {
            gate: Arc::clone(&state.gate),
            policy: Arc::from(policy),
        }
    }

    pub fn policy(&self) -> &str {
        &self.policy
    }
}

/// Evaluates the guard's policy against the authenticated caller.
pub async fn enforce_policy(
    State(guard): State<PolicyGuard>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let principal = parts
        .extensions
        .get::<CurrentPrincipal>()
        .and_then(|current| current.0.clone());

    let ctx = match parts.extensions.get::<RequestContext>() {
        Some(ctx) => ctx.clone(),
        None => request_context(&mut parts, CancellationToken::new()).await,
    };

    if let Err(denial) = guard.gate.check(&guard.policy, principal.as_ref(), Some(&ctx)).await {
        info!(
            policy = guard.policy(),
            operation = ctx.operation().unwrap_or_default(),
            %denial,
            "Request denied"
        );
        return DenialResponse(denial).into_response();
    }

    next.run(Request::from_parts(parts, body)).await
}
