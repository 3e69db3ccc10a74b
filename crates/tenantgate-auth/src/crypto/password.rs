//! Argon2id password hashing with caller-supplied salt and iteration count.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use tenantgate_core::config::CryptoConfig;
use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;

use super::compare::constant_time_eq;
use super::random::random_bytes;

/// Derived hash length in bytes.
const OUTPUT_LEN: usize = 32;
/// Generated salt length in bytes.
const SALT_LEN: usize = 16;
/// Shortest salt Argon2 accepts.
const MIN_SALT_LEN: usize = 8;
/// Argon2 needs at least 8 KiB per lane.
const MIN_MEMORY_KIB: u32 = 8;

/// Hashes and validates passwords using Argon2id.
///
/// The iteration count maps to Argon2's time cost. Counts below the
/// configured minimum are replaced by the minimum on both the hash and the
/// validate path, so a stored hash always validates with the count it was
/// created with.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Lowest accepted iteration count.
    min_iterations: u32,
    /// Memory cost in KiB.
    memory_kib: u32,
}

impl PasswordHasher {
    /// Creates a hasher from crypto configuration.
    pub fn new(config: &CryptoConfig) -> Self {
        Self {
            min_iterations: config.min_password_iterations.max(1),
            memory_kib: config.password_memory_kib.max(MIN_MEMORY_KIB),
        }
    }

    /// Iteration count actually used for a requested count.
    pub fn effective_iterations(&self, iterations: u32) -> u32 {
        iterations.max(self.min_iterations)
    }

    /// Hashes a password; returns the base64 encoded derived key.
    pub fn hash_password(&self, password: &str, iterations: u32, salt: &str) -> AppResult<String> {
        let derived = self.derive(password, iterations, salt)?;
        Ok(BASE64.encode(derived))
    }

    /// Returns whether `password` produces `hash` under the same salt and
    /// iteration count. Malformed inputs validate as false.
    pub fn validate_password(&self, password: &str, hash: &str, salt: &str, iterations: u32) -> bool {
        let Ok(expected) = BASE64.decode(hash.as_bytes()) else {
            return false;
        };
        match self.derive(password, iterations, salt) {
            Ok(derived) => constant_time_eq(&derived, &expected),
            Err(e) => {
                tracing::warn!(error = %e, "Password validation failed");
                false
            }
        }
    }

    /// Random salt, base64 encoded.
    pub fn generate_salt() -> String {
        BASE64.encode(random_bytes(SALT_LEN))
    }

    fn derive(&self, password: &str, iterations: u32, salt: &str) -> AppResult<[u8; OUTPUT_LEN]> {
        if salt.len() < MIN_SALT_LEN {
            return Err(AppError::crypto(format!(
                "Salt must be at least {MIN_SALT_LEN} bytes"
            )));
        }

        let params = Params::new(
            self.memory_kib,
            self.effective_iterations(iterations),
            1,
            Some(OUTPUT_LEN),
        )
        .map_err(|e| AppError::crypto(format!("Invalid Argon2 parameters: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut out = [0u8; OUTPUT_LEN];
        argon2
            .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut out)
            .map_err(|e| AppError::crypto(format!("Password hashing failed: {e}")))?;
        Ok(out)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(&CryptoConfig::default())
    }
}
