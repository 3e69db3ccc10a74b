//! Constant-time credential comparison.

use sha2::{Digest, Sha256};

/// Compares two secrets without early exit.
///
/// Both sides are digested first so the comparison runs over a fixed
/// 32 bytes regardless of input lengths.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let left = Sha256::digest(a);
    let right = Sha256::digest(b);
    let diff = left
        .iter()
        .zip(right.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}

/// String convenience over [`constant_time_eq`].
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}
