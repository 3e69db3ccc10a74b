//! Shared state for the authentication middleware.

use std::sync::Arc;

use tenantgate_auth::AuthGate;
use tenantgate_cache::CacheManager;
use tenantgate_core::config::AppConfig;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::IdentityService;

/// State handed to the auth middleware.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// Application configuration, loaded once at startup.
    pub config: Arc<AppConfig>,
    /// Cache manager (Redis or in-memory).
    pub cache: Arc<CacheManager>,
    /// Authentication and authorization entry point.
    pub gate: Arc<AuthGate>,
}

impl AuthState {
    /// Connects the configured cache and builds the gate on top of it.
    pub async fn from_config(
        config: AppConfig,
        identity: Arc<dyn IdentityService>,
    ) -> AppResult<Self> {
        let cache = Arc::new(CacheManager::new(&config.cache).await?);
        Self::with_cache(config, cache, identity)
    }

    /// Builds the gate over an existing cache.
    pub fn with_cache(
        config: AppConfig,
        cache: Arc<CacheManager>,
        identity: Arc<dyn IdentityService>,
    ) -> AppResult<Self> {
        let gate = AuthGate::with_cache(&config, Arc::clone(&cache), identity)?;
        Ok(Self {
            config: Arc::new(config),
            cache,
            gate: Arc::new(gate),
        })
    }
}
