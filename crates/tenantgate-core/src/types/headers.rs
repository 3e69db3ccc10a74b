//! Header, query and route names consumed by the authorization core.
//!
//! Header names are lowercase; [`RequestContext`](super::RequestContext)
//! normalizes incoming names before lookup.

pub const AUTHORIZATION: &str = "authorization";
pub const API_KEY: &str = "x-api-key";
pub const SESSION_ID: &str = "x-session-id";
pub const FINGERPRINT: &str = "x-fingerprint";
pub const USER_AGENT: &str = "user-agent";
pub const ACCEPT_LANGUAGE: &str = "accept-language";

/// Forwarded client-address headers, highest precedence first.
pub const FORWARDED_IP: [&str; 4] = [
    "cf-connecting-ip",
    "true-client-ip",
    "x-real-ip",
    "x-forwarded-for",
];

/// Query parameter carrying the API key when the header is absent.
pub const API_KEY_QUERY: &str = "X-API-Key";

/// Route/query value naming the office a request targets.
pub const OFFICE_ID: &str = "officeId";

/// Route value accepted in place of a numeric office id.
pub const ENABLE_OFFICE: &str = "enableOffice";

/// Route value scoping webhook calls to a lender.
pub const LENDER_CODE: &str = "lenderCode";

/// `Authorization` scheme prefixes.
pub const BEARER_PREFIX: &str = "Bearer ";
pub const BASIC_PREFIX: &str = "Basic ";
pub const WEBHOOK_PREFIX: &str = "WebHookApiKey ";
