//! Hashing and password configuration.

use serde::{Deserialize, Serialize};

/// Settings for the crypto primitives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// Iteration counts below this are replaced by it when hashing passwords.
    #[serde(default = "default_min_iterations")]
    pub min_password_iterations: u32,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub password_memory_kib: u32,
    /// Number of hex characters kept by the short hash.
    #[serde(default = "default_short_hash_length")]
    pub short_hash_length: usize,
    /// Secret mixed into partition-key hashes.
    #[serde(default)]
    pub partition_pepper: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            min_password_iterations: default_min_iterations(),
            password_memory_kib: default_memory_kib(),
            short_hash_length: default_short_hash_length(),
            partition_pepper: String::new(),
        }
    }
}

fn default_min_iterations() -> u32 {
    2
}

fn default_memory_kib() -> u32 {
    19_456
}

fn default_short_hash_length() -> usize {
    16
}
