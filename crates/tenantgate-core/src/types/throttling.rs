//! Partition keys and failure state for session-validation throttling.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Independent scopes under which failures are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    User,
    Fingerprint,
    Composite,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Fingerprint => write!(f, "fp"),
            Self::Composite => write!(f, "composite"),
        }
    }
}

/// Hashed partition keys for one request.
///
/// Built fresh per request. Every key is already one-way hashed; raw
/// fingerprints and addresses never reach this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottlingContext {
    /// Present only when the principal carries a known external identity id.
    pub user_key: Option<String>,
    pub fingerprint_key: String,
    pub composite_key: String,
}

impl ThrottlingContext {
    /// The present partitions with their keys.
    pub fn partitions(&self) -> Vec<(Partition, &str)> {
        let mut partitions = Vec::with_capacity(3);
        if let Some(user) = &self.user_key {
            partitions.push((Partition::User, user.as_str()));
        }
        partitions.push((Partition::Fingerprint, self.fingerprint_key.as_str()));
        partitions.push((Partition::Composite, self.composite_key.as_str()));
        partitions
    }
}

/// Failure bookkeeping for one partition key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureState {
    /// Failures counted in the current window.
    pub count: u32,
    /// When the current window opened.
    pub window_start_utc: Option<DateTime<Utc>>,
    /// End of the active lock, if any.
    pub locked_until_utc: Option<DateTime<Utc>>,
}

impl FailureState {
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until_utc.is_some_and(|until| until > now)
    }
}
