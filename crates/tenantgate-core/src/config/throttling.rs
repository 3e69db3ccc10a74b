//! Throttling configuration for failed session validations.

use serde::{Deserialize, Serialize};

/// Lockout policy applied independently to every partition key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottlingConfig {
    /// Failures within one window that trip a lock.
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
    /// Length of the failure counting window in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Duration of the first lock in seconds.
    #[serde(default = "default_base_lockout")]
    pub base_lockout_seconds: u64,
    /// Factor applied to the lock duration on each repeated lock.
    #[serde(default = "default_multiplier")]
    pub backoff_multiplier: u32,
    /// Upper bound on the lock duration in seconds.
    #[serde(default = "default_max_lockout")]
    pub max_lockout_seconds: u64,
    /// Prefix for every throttling cache key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for ThrottlingConfig {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            window_seconds: default_window(),
            base_lockout_seconds: default_base_lockout(),
            backoff_multiplier: default_multiplier(),
            max_lockout_seconds: default_max_lockout(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl ThrottlingConfig {
    /// Lock duration in seconds for the given escalation level (1-based).
    pub fn lockout_seconds(&self, level: u32) -> u64 {
        let exponent = level.saturating_sub(1);
        let factor = u64::from(self.backoff_multiplier.max(1)).saturating_pow(exponent);
        self.base_lockout_seconds
            .saturating_mul(factor)
            .min(self.max_lockout_seconds)
    }
}

fn default_max_failures() -> u32 {
    5
}

fn default_window() -> u64 {
    900
}

fn default_base_lockout() -> u64 {
    60
}

fn default_multiplier() -> u32 {
    2
}

fn default_max_lockout() -> u64 {
    3600
}

fn default_key_prefix() -> String {
    "tenantgate:throttle".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lockout_escalates_and_caps() {
        let config = ThrottlingConfig::default();
        assert_eq!(config.lockout_seconds(1), 60);
        assert_eq!(config.lockout_seconds(2), 120);
        assert_eq!(config.lockout_seconds(3), 240);
        assert_eq!(config.lockout_seconds(40), 3600);
    }
}
