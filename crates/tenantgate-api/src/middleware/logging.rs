//! Request/response logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use crate::extractors::CurrentPrincipal;

/// Logs request method, path, status, duration, and the resolved scheme.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();
    let scheme = response
        .extensions()
        .get::<CurrentPrincipal>()
        .and_then(|current| current.0.as_ref())
        .map(|principal| principal.scheme().to_string());

    info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        scheme = scheme.as_deref().unwrap_or("anonymous"),
        "HTTP request"
    );

    response
}
