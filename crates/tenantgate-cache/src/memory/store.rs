//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::debug;

use tenantgate_core::config::MemoryCacheConfig;
use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::CacheProvider;

/// A cached string and its absolute deadline. Counters are entries too,
/// so every key is bounded by `max_capacity`.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

/// Expires each entry at its own deadline. Updates keep the deadline, so
/// incrementing a counter does not extend its window.
struct DeadlineExpiry;

impl Expiry<String, Entry> for DeadlineExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        created_at: Instant,
    ) -> Option<Duration> {
        value
            .expires_at
            .map(|at| at.saturating_duration_since(created_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value
            .expires_at
            .map(|at| at.saturating_duration_since(updated_at))
    }
}

/// In-memory cache provider using moka.
///
/// `incr` and `expire` are single `and_compute_with` calls, which moka
/// serialises per key.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, Entry>,
    /// Default TTL for entries.
    default_ttl: Duration,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(DeadlineExpiry)
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }

    /// A zero TTL means "use the configured default".
    fn deadline(&self, ttl: Duration) -> Option<Instant> {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        Some(Instant::now() + ttl)
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at: self.deadline(ttl),
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.get(key).await.is_some())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let expires_at = self.deadline(ttl);
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert_with(async {
                Entry {
                    value: value.to_string(),
                    expires_at,
                }
            })
            .await;
        Ok(entry.is_fresh())
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|current| {
                let op = match current.map(|entry| entry.into_value()) {
                    None => Op::Put(Entry {
                        value: "1".to_string(),
                        expires_at: None,
                    }),
                    Some(entry) => match entry.value.parse::<i64>() {
                        Ok(n) => Op::Put(Entry {
                            value: n.saturating_add(1).to_string(),
                            expires_at: entry.expires_at,
                        }),
                        Err(_) => Op::Nop,
                    },
                };
                std::future::ready(op)
            })
            .await;

        match result {
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => entry
                .into_value()
                .value
                .parse()
                .map_err(|_| AppError::cache(format!("Counter at '{key}' is corrupt"))),
            _ => Err(AppError::cache(format!("Value at '{key}' is not an integer"))),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let expires_at = Some(Instant::now() + ttl);
        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|current| {
                let op = match current {
                    Some(entry) => Op::Put(Entry {
                        value: entry.into_value().value,
                        expires_at,
                    }),
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        let updated = matches!(result, CompResult::ReplacedWith(_));
        if updated {
            debug!(key, ttl_ms = ttl.as_millis() as u64, "Entry TTL updated");
        }
        Ok(updated)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
