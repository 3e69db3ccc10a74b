//! Cache key builders for all TenantGate cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses. Partition keys passed in here
//! are already hashed.

use tenantgate_core::types::Partition;

/// Prefix applied to session cache keys.
const SESSION_PREFIX: &str = "tenantgate:session";

// ── Throttling keys ────────────────────────────────────────

/// Failure counter for one partition key.
pub fn failure_count(prefix: &str, partition: Partition, key: &str) -> String {
    format!("{prefix}:fail:{partition}:{key}")
}

/// Start of the failure window for one partition key.
pub fn failure_window(prefix: &str, partition: Partition, key: &str) -> String {
    format!("{prefix}:window:{partition}:{key}")
}

/// Active lock marker holding the locked-until timestamp.
pub fn lock(prefix: &str, partition: Partition, key: &str) -> String {
    format!("{prefix}:lock:{partition}:{key}")
}

/// Lock escalation level used for backoff.
pub fn lock_level(prefix: &str, partition: Partition, key: &str) -> String {
    format!("{prefix}:level:{partition}:{key}")
}

// ── Session keys ───────────────────────────────────────────

/// Session record by id.
pub fn session(session_id: &str) -> String {
    format!("{SESSION_PREFIX}:{session_id}")
}
