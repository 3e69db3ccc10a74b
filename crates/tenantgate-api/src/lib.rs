//! # tenantgate-api
//!
//! Axum integration for TenantGate. Routes opt in with two route layers:
//! [`middleware::authenticate`] resolves the caller once per request, and
//! [`middleware::enforce_policy`] evaluates a named policy, turning a
//! denial into a generic 401 or 403.

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod state;
pub mod telemetry;

pub use error::DenialResponse;
pub use extractors::{Authenticated, CurrentPrincipal};
pub use state::AuthState;
