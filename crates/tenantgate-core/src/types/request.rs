//! Framework-neutral view of an inbound request.

use std::collections::HashMap;
use std::net::IpAddr;

use tokio_util::sync::CancellationToken;

use super::headers;

/// The parts of a request the authorization core inspects.
///
/// Header names are stored lowercase. Route values and query parameters
/// keep their original case. The cancellation token is shared by every
/// collaborator call made on behalf of this request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    route: HashMap<String, String>,
    remote_addr: Option<IpAddr>,
    operation: Option<String>,
    cancel: CancellationToken,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_route(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route.insert(name.into(), value.into());
        self
    }

    pub fn with_remote_addr(mut self, addr: IpAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Sets the operation name, `"METHOD /route/template"`.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Non-blank header value.
    pub fn non_empty_header(&self, name: &str) -> Option<&str> {
        self.header(name).filter(|v| !v.trim().is_empty())
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn route(&self, name: &str) -> Option<&str> {
        self.route.get(name).map(String::as_str)
    }

    /// Route value, falling back to the query string.
    pub fn route_or_query(&self, name: &str) -> Option<&str> {
        self.route(name).or_else(|| self.query(name))
    }

    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Client address by forwarded-header precedence, then the socket peer.
    ///
    /// Only the first entry of a comma-separated forwarded list is used.
    pub fn client_ip(&self) -> String {
        headers::FORWARDED_IP
            .iter()
            .filter_map(|name| self.non_empty_header(name))
            .filter_map(|value| value.split(',').next())
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(String::from)
            .or_else(|| self.remote_addr.map(|addr| addr.to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    }
}
