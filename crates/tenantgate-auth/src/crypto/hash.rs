//! One-way hashing for partition keys and log-safe identifiers.

use sha2::{Digest, Sha256};

use tenantgate_core::config::CryptoConfig;

const MIN_SHORT_LEN: usize = 8;
const MAX_SHORT_LEN: usize = 64;

/// Full SHA-256 digest as lowercase hex.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Truncated, peppered SHA-256 used for partition keys.
#[derive(Debug, Clone)]
pub struct ShortHasher {
    pepper: String,
    length: usize,
}

impl ShortHasher {
    pub fn new(config: &CryptoConfig) -> Self {
        Self {
            pepper: config.partition_pepper.clone(),
            length: config.short_hash_length.clamp(MIN_SHORT_LEN, MAX_SHORT_LEN),
        }
    }

    /// First `length` hex characters of `SHA-256(pepper || input)`.
    pub fn hash(&self, input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.pepper.as_bytes());
        hasher.update(input.as_bytes());
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(self.length);
        digest
    }
}

impl Default for ShortHasher {
    fn default() -> Self {
        Self::new(&CryptoConfig::default())
    }
}
