//! Request extractors.

pub mod context;
pub mod principal;

pub use context::request_context;
pub use principal::{Authenticated, CurrentPrincipal};
