//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use tenantgate_api::middleware::{PolicyGuard, authenticate, enforce_policy, request_logging};
use tenantgate_api::telemetry::http_trace_layer;
use tenantgate_api::{AuthState, Authenticated};
use tenantgate_auth::session::CachedSessionStore;
use tenantgate_cache::CacheManager;
use tenantgate_core::config::{AppConfig, AuthConfig, JwtConfig, ThrottlingConfig};
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::IdentityService;
use tenantgate_core::types::Principal;

pub const API_KEY: &str = "test-api-key";
pub const JWT_SECRET: &str = "integration-test-secret";

/// Identity service backed by fixed tables.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    /// office id -> member external ids
    pub members: HashMap<i64, HashSet<String>>,
    /// (user id, office id) -> permissions; `None` covers callers without
    /// a user id.
    pub permissions: HashMap<(Option<i64>, i64), HashSet<String>>,
}

#[async_trait]
impl IdentityService for StaticIdentity {
    async fn validate_office_membership(
        &self,
        principal: &Principal,
        office_id: i64,
        _cancel: &CancellationToken,
    ) -> AppResult<bool> {
        Ok(principal.external_id().is_some_and(|id| {
            self.members
                .get(&office_id)
                .is_some_and(|members| members.contains(id))
        }))
    }

    async fn get_user_permissions(
        &self,
        user_id: Option<i64>,
        office_id: i64,
        _cancel: &CancellationToken,
    ) -> AppResult<HashSet<String>> {
        Ok(self
            .permissions
            .get(&(user_id, office_id))
            .cloned()
            .unwrap_or_default())
    }
}

impl StaticIdentity {
    pub fn grant(mut self, user_id: Option<i64>, office_id: i64, permission: &str) -> Self {
        self.permissions
            .entry((user_id, office_id))
            .or_default()
            .insert(permission.to_string());
        self
    }

    pub fn member(mut self, office_id: i64, external_id: &str) -> Self {
        self.members
            .entry(office_id)
            .or_default()
            .insert(external_id.to_string());
        self
    }
}

/// A response reduced to what the tests inspect.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared cache, for creating sessions directly
    pub sessions: CachedSessionStore,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    pub fn new(enforce_session: bool, identity: StaticIdentity) -> Self {
        let config = AppConfig {
            auth: AuthConfig {
                api_key: Some(API_KEY.to_string()),
                webhook_keys: HashMap::from([("ACME".to_string(), "SECRET123".to_string())]),
                jwt: JwtConfig {
                    secret: Some(JWT_SECRET.to_string()),
                    ..JwtConfig::default()
                },
                enforce_session,
                ..AuthConfig::default()
            },
            throttling: ThrottlingConfig {
                max_failures: 5,
                ..ThrottlingConfig::default()
            },
            ..AppConfig::default()
        };

        let cache = Arc::new(CacheManager::in_memory());
        let state = AuthState::with_cache(config.clone(), Arc::clone(&cache), Arc::new(identity))
            .expect("Failed to build auth state");

        let router = Router::new()
            .route(
                "/api/offices/{officeId}/loans",
                get(whoami).route_layer(from_fn_with_state(
                    PolicyGuard::new(&state, "Loans.Read"),
                    enforce_policy,
                )),
            )
            .route(
                "/api/webhooks/{lenderCode}/events",
                post(whoami).route_layer(from_fn_with_state(
                    PolicyGuard::new(&state, "Loans.Write"),
                    enforce_policy,
                )),
            )
            .route(
                "/api/webhooks/{lenderCode}/ping",
                post(whoami).route_layer(from_fn_with_state(
                    PolicyGuard::new(&state, ""),
                    enforce_policy,
                )),
            )
            .route(
                "/api/offices/{officeId}/members",
                get(whoami).route_layer(from_fn_with_state(
                    PolicyGuard::new(&state, "OfficeUser"),
                    enforce_policy,
                )),
            )
            .route(
                "/api/admin",
                get(whoami).route_layer(from_fn_with_state(
                    PolicyGuard::new(&state, "SuperAdmin"),
                    enforce_policy,
                )),
            )
            .route(
                "/api/me",
                get(whoami).route_layer(from_fn_with_state(
                    PolicyGuard::new(&state, ""),
                    enforce_policy,
                )),
            )
            .route_layer(from_fn_with_state(state.clone(), authenticate))
            .layer(from_fn(request_logging))
            .layer(http_trace_layer());

        Self {
            router,
            sessions: CachedSessionStore::new(cache),
            config,
        }
    }

    /// Sends a request with the given headers and returns status and JSON body.
    pub async fn request(&self, method: Method, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    pub async fn get(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request(Method::GET, path, headers).await
    }

    /// Creates a session bound to `fingerprint`.
    pub async fn create_session(&self, fingerprint: &str) -> String {
        self.sessions
            .create_session(fingerprint, Duration::from_secs(600))
            .await
            .expect("Failed to create session")
    }

    /// Signs a bearer token for this app's issuer and audience.
    pub fn bearer_token(&self, claims: Value) -> String {
        let jwt = &self.config.auth.jwt;
        let mut claims = claims;
        claims["iss"] = json!(jwt.issuer);
        claims["aud"] = json!(jwt.audience);
        claims["exp"] = json!((chrono::Utc::now() + chrono::Duration::minutes(5)).timestamp());
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .expect("Failed to sign token")
    }
}

async fn whoami(Authenticated(principal): Authenticated) -> axum::Json<Value> {
    axum::Json(json!({
        "name": principal.name(),
        "scheme": principal.scheme().to_string(),
    }))
}
