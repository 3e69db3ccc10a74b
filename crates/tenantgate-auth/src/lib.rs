//! # tenantgate-auth
//!
//! Authentication and authorization for TenantGate:
//!
//! - `credentials`: the five credential resolvers, tried in fixed order
//! - `policy`: policy names expanded into requirements
//! - `requirements`: super-admin, office-membership, permission and
//!   session evaluators
//! - `throttling`: partitioned failure tracking with escalating lockouts
//! - `session`: cache-backed session store
//! - `token`: bearer token validation
//! - `crypto`: hashing, encryption, password and random primitives
//! - `outcome`: failure taxonomy and the denial mapping
//! - `gate`: [`AuthGate`], which ties the above together

pub mod credentials;
pub mod crypto;
pub mod gate;
pub mod outcome;
pub mod policy;
pub mod requirements;
pub mod session;
pub mod throttling;
pub mod token;

pub use credentials::{Authentication, CredentialResolver, ResolveOutcome};
pub use gate::{AuthGate, Collaborators};
pub use outcome::{AuthFailure, AuthorizationOutcome, Denial, RequirementKind, map_outcome};
pub use policy::{PolicyResolver, Requirement};
