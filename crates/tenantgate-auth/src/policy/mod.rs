//! Policy names and the requirements they expand to.

pub mod requirement;
pub mod resolver;

pub use requirement::{PermissionRequirement, Requirement};
pub use resolver::{Policy, PolicyResolver};
