//! Axum middleware stack.
//!
//! Install both auth layers with `route_layer` so route values are
//! available, and add `authenticate` last so it runs first:
//!
//! ```ignore
//! Router::new()
//!     .route("/offices/{officeId}/loans", get(list).route_layer(
//!         from_fn_with_state(PolicyGuard::new(&state, "Loans.Read"), enforce_policy),
//!     ))
//!     .route_layer(from_fn_with_state(state.clone(), authenticate))
//! ```

pub mod authenticate;
pub mod logging;
pub mod policy;

pub use authenticate::authenticate;
pub use logging::request_logging;
pub use policy::{PolicyGuard, enforce_policy};
