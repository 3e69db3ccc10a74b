//! Bearer token validation.

pub mod jwt;

pub use jwt::JwtTokenValidator;
