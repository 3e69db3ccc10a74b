//! Shared value types.

pub mod headers;
pub mod principal;
pub mod request;
pub mod throttling;
pub mod token;

pub use principal::{
    API_CLIENT_NAME, CLIENT_CREDENTIALS, Claim, ClaimType, Principal, PrincipalBuilder,
    SESSION_USER_NAME, SchemeKind,
};
pub use request::RequestContext;
pub use throttling::{FailureState, Partition, ThrottlingContext};
pub use token::TokenClaims;
