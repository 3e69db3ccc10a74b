//! Builds the framework-neutral [`RequestContext`] from axum request parts.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, MatchedPath, Query, RawPathParams};
use axum::http::request::Parts;
use tokio_util::sync::CancellationToken;

use tenantgate_core::types::RequestContext;

/// Collects headers, query pairs, route values, peer address and the
/// matched operation. Route values are only available inside route layers.
pub async fn request_context(parts: &mut Parts, cancel: CancellationToken) -> RequestContext {
    let mut ctx = RequestContext::new().with_cancellation(cancel);

    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            ctx = ctx.with_header(name.as_str(), value);
        }
    }

    if let Ok(Query(query)) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
        for (name, value) in query {
            ctx = ctx.with_query(name, value);
        }
    }

    if let Ok(params) = RawPathParams::from_request_parts(parts, &()).await {
        for (name, value) in &params {
            ctx = ctx.with_route(name, value);
        }
    }

    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        ctx = ctx.with_remote_addr(addr.ip());
    }

    if let Some(matched) = parts.extensions.get::<MatchedPath>() {
        ctx = ctx.with_operation(format!("{} {}", parts.method, matched.as_str()));
    }

    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    #[tokio::test]
    async fn test_headers_and_query_are_collected() {
        let request = Request::builder()
            .uri("/api/things?officeId=42&X-API-Key=k")
            .header("X-Session-Id", "abc")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let ctx = request_context(&mut parts, CancellationToken::new()).await;

        assert_eq!(ctx.header("x-session-id"), Some("abc"));
        assert_eq!(ctx.query("officeId"), Some("42"));
        assert_eq!(ctx.query("X-API-Key"), Some("k"));
        assert_eq!(ctx.operation(), None);
    }
}
