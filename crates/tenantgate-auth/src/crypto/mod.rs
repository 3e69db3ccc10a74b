//! Crypto primitives: hashing, constant-time comparison, symmetric and
//! asymmetric encryption, password hashing, and random generation.

#[cfg(feature = "asymmetric")]
pub mod asymmetric;
pub mod compare;
pub mod hash;
pub mod password;
pub mod random;
pub mod symmetric;

pub use compare::constant_time_eq;
pub use hash::{ShortHasher, sha256_hex};
pub use password::PasswordHasher;
