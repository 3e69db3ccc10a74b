//! Throttling store trait.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::result::AppResult;
use crate::types::{FailureState, Partition, ThrottlingContext};

/// Tracks failures and lock expiries per partition key.
///
/// Implementations are the only place concurrent mutation of failure state
/// happens and must make individual updates safe under concurrency. The
/// check-then-register sequence performed by callers is not atomic.
#[async_trait]
pub trait ThrottlingStore: Send + Sync + std::fmt::Debug {
    /// True if any present partition is locked.
    async fn is_locked(
        &self,
        context: &ThrottlingContext,
        cancel: &CancellationToken,
    ) -> AppResult<bool>;

    /// Counts a failure on every present partition, tripping or extending
    /// locks per the backoff policy.
    async fn register_failure(
        &self,
        context: &ThrottlingContext,
        cancel: &CancellationToken,
    ) -> AppResult<()>;

    /// Forgets failures and locks on every present partition.
    async fn clear(&self, context: &ThrottlingContext, cancel: &CancellationToken)
    -> AppResult<()>;

    /// Current state of a single partition key.
    async fn failure_state(&self, partition: Partition, key: &str) -> AppResult<FailureState>;
}
