//! Cache-backed throttling store with escalating lockouts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use tenantgate_cache::CacheManager;
use tenantgate_cache::keys;
use tenantgate_core::config::ThrottlingConfig;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::{CacheProvider, ThrottlingStore, cancellable};
use tenantgate_core::types::{FailureState, Partition, ThrottlingContext};

/// Longest lock ever written, whatever the configured ceiling.
const LOCKOUT_CEILING: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Tracks failures per partition key in the shared cache.
///
/// Counter increments are atomic in the backend. Checking a lock and then
/// registering a failure are separate calls, so two concurrent failures on
/// the same partition can both pass the check before either is counted.
#[derive(Debug, Clone)]
pub struct CacheThrottlingStore {
    /// Shared cache backend.
    cache: Arc<CacheManager>,
    /// Lockout policy.
    config: ThrottlingConfig,
}

impl CacheThrottlingStore {
    /// Creates a store over the given cache.
    pub fn new(cache: Arc<CacheManager>, config: ThrottlingConfig) -> Self {
        Self { cache, config }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_seconds.max(1))
    }

    fn level_ttl(&self) -> Duration {
        Duration::from_secs(self.config.max_lockout_seconds.saturating_mul(4).max(1))
            .min(LOCKOUT_CEILING)
    }

    fn lockout(&self, level: u32) -> Duration {
        Duration::from_secs(self.config.lockout_seconds(level).max(1)).min(LOCKOUT_CEILING)
    }

    async fn locked_until(&self, partition: Partition, key: &str) -> AppResult<Option<DateTime<Utc>>> {
        let prefix = &self.config.key_prefix;
        let raw = self.cache.get(&keys::lock(prefix, partition, key)).await?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }

    async fn partition_locked(&self, partition: Partition, key: &str) -> AppResult<bool> {
        let now = Utc::now();
        Ok(self
            .locked_until(partition, key)
            .await?
            .is_some_and(|until| until > now))
    }

    async fn register_partition_failure(&self, partition: Partition, key: &str) -> AppResult<()> {
        let prefix = &self.config.key_prefix;
        let count_key = keys::failure_count(prefix, partition, key);
        let window_key = keys::failure_window(prefix, partition, key);
        let now = Utc::now();

        let count = self.cache.incr(&count_key).await?;
        if count == 1 {
            self.cache.expire(&count_key, self.window()).await?;
            self.cache
                .set_nx(&window_key, &now.to_rfc3339(), self.window())
                .await?;
        }

        debug!(%partition, key, count, "Failure registered");

        if count < i64::from(self.config.max_failures.max(1)) {
            return Ok(());
        }

        let level_key = keys::lock_level(prefix, partition, key);
        let level = self.cache.incr(&level_key).await?;
        self.cache.expire(&level_key, self.level_ttl()).await?;

        let level = u32::try_from(level).unwrap_or(u32::MAX);
        let lockout = self.lockout(level);
        let until = TimeDelta::from_std(lockout)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.cache
            .set(&keys::lock(prefix, partition, key), &until.to_rfc3339(), lockout)
            .await?;
        self.cache.delete(&count_key).await?;
        self.cache.delete(&window_key).await?;

        warn!(
            %partition,
            key,
            level,
            lockout_seconds = lockout.as_secs(),
            "Partition locked after repeated session failures"
        );
        Ok(())
    }

    async fn clear_partition(&self, partition: Partition, key: &str) -> AppResult<()> {
        let prefix = &self.config.key_prefix;
        self.cache.delete(&keys::failure_count(prefix, partition, key)).await?;
        self.cache.delete(&keys::failure_window(prefix, partition, key)).await?;
        self.cache.delete(&keys::lock(prefix, partition, key)).await?;
        self.cache.delete(&keys::lock_level(prefix, partition, key)).await?;
        Ok(())
    }
}

#[async_trait]
impl ThrottlingStore for CacheThrottlingStore {
    async fn is_locked(
        &self,
        context: &ThrottlingContext,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        cancellable(cancel, async {
            for (partition, key) in context.partitions() {
                if self.partition_locked(partition, key).await? {
                    debug!(%partition, key, "Partition is locked");
                    return Ok(true);
                }
            }
            Ok(false)
        })
        .await
    }

    async fn register_failure(
        &self,
        context: &ThrottlingContext,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        cancellable(cancel, async {
            for (partition, key) in context.partitions() {
                self.register_partition_failure(partition, key).await?;
            }
            Ok(())
        })
        .await
    }

    async fn clear(&self, context: &ThrottlingContext, cancel: &CancellationToken) -> AppResult<()> {
        cancellable(cancel, async {
            for (partition, key) in context.partitions() {
                self.clear_partition(partition, key).await?;
            }
            Ok(())
        })
        .await
    }

    async fn failure_state(&self, partition: Partition, key: &str) -> AppResult<FailureState> {
        let prefix = &self.config.key_prefix;
        let count = self
            .cache
            .get(&keys::failure_count(prefix, partition, key))
            .await?
            .and_then(|raw| raw.parse::<u32>().ok())
            .unwrap_or(0);
        let window_start_utc = self
            .cache
            .get(&keys::failure_window(prefix, partition, key))
            .await?
            .as_deref()
            .and_then(parse_timestamp);

        Ok(FailureState {
            count,
            window_start_utc,
            locked_until_utc: self.locked_until(partition, key).await?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
