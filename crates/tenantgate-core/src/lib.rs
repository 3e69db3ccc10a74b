//! # tenantgate-core
//!
//! Core crate for TenantGate. Contains configuration schemas, the
//! collaborator traits the authorization core consumes (session store,
//! identity service, token validator, throttling store, cache), the
//! principal and request types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TenantGate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
