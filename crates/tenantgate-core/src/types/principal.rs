//! The authenticated principal a credential scheme asserts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The five mutually exclusive credential schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    /// Static server key in `X-API-Key`.
    ApiKey,
    /// Opaque session id in `X-Session-Id`.
    Session,
    /// Signed bearer token.
    Bearer,
    /// Per-lender webhook key.
    Webhook,
    /// HTTP Basic credentials.
    Basic,
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey => write!(f, "ApiKey"),
            Self::Session => write!(f, "Session"),
            Self::Bearer => write!(f, "Bearer"),
            Self::Webhook => write!(f, "WebHookApiKey"),
            Self::Basic => write!(f, "Basic"),
        }
    }
}

/// Claim categories carried by a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Display name of the caller.
    Name,
    /// Numeric platform user id.
    UserId,
    /// External identity-provider id the session must be bound to.
    ExternalId,
    /// Office the caller is a member of (repeatable).
    OfficeId,
    /// Role name (repeatable).
    Role,
    /// Session id for session-authenticated callers.
    SessionId,
    /// Derived super-admin attribute.
    SuperAdmin,
    /// Grant type of the bearer token, e.g. `client_credentials`.
    GrantType,
    /// Scheme marker for webhook callers.
    Scheme,
}

/// A single typed claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Claim category.
    pub kind: ClaimType,
    /// Claim value.
    pub value: String,
}

/// Immutable principal built by exactly one credential resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    scheme: SchemeKind,
    claims: Vec<Claim>,
}

/// Grant type of service-to-service bearer tokens.
pub const CLIENT_CREDENTIALS: &str = "client_credentials";

/// Name claim given to API-key callers.
pub const API_CLIENT_NAME: &str = "ApiClient";

/// Name claim given to session callers.
pub const SESSION_USER_NAME: &str = "SessionUser";

impl Principal {
    /// Starts building a principal for the given scheme.
    pub fn builder(scheme: SchemeKind) -> PrincipalBuilder {
        PrincipalBuilder {
            scheme,
            claims: Vec::new(),
        }
    }

    /// The scheme that authenticated this principal.
    pub fn scheme(&self) -> SchemeKind {
        self.scheme
    }

    /// All claims in insertion order.
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// First value of a claim type.
    pub fn find(&self, kind: ClaimType) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.value.as_str())
    }

    /// Every value of a claim type.
    pub fn find_all(&self, kind: ClaimType) -> impl Iterator<Item = &str> {
        self.claims
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| c.value.as_str())
    }

    /// Whether a claim with this exact value exists.
    pub fn has_claim(&self, kind: ClaimType, value: &str) -> bool {
        self.claims.iter().any(|c| c.kind == kind && c.value == value)
    }

    pub fn name(&self) -> Option<&str> {
        self.find(ClaimType::Name)
    }

    /// Numeric user id, if present and parseable.
    pub fn user_id(&self) -> Option<i64> {
        self.find(ClaimType::UserId).and_then(|v| v.parse().ok())
    }

    /// Known external identity id, if any. Blank values count as absent.
    pub fn external_id(&self) -> Option<&str> {
        self.find(ClaimType::ExternalId).filter(|v| !v.trim().is_empty())
    }

    pub fn session_id(&self) -> Option<&str> {
        self.find(ClaimType::SessionId)
    }

    /// Office ids the principal claims membership of.
    pub fn office_ids(&self) -> Vec<i64> {
        self.find_all(ClaimType::OfficeId)
            .filter_map(|v| v.parse().ok())
            .collect()
    }

    pub fn is_member_of(&self, office_id: i64) -> bool {
        self.office_ids().contains(&office_id)
    }

    pub fn has_office_claim(&self) -> bool {
        self.find(ClaimType::OfficeId).is_some()
    }

    pub fn is_super_admin(&self) -> bool {
        self.has_claim(ClaimType::SuperAdmin, "true")
    }

    /// Bearer principal issued through the client-credentials grant.
    pub fn is_client_credentials(&self) -> bool {
        self.scheme == SchemeKind::Bearer
            && self.has_claim(ClaimType::GrantType, CLIENT_CREDENTIALS)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.find_all(ClaimType::Role)
    }
}

/// Builder producing an immutable [`Principal`].
///
/// Duplicate `(kind, value)` pairs are dropped so the claim list behaves
/// as an ordered set.
#[derive(Debug, Clone)]
pub struct PrincipalBuilder {
    scheme: SchemeKind,
    claims: Vec<Claim>,
}

impl PrincipalBuilder {
    /// Adds a claim.
    pub fn claim(mut self, kind: ClaimType, value: impl Into<String>) -> Self {
        let claim = Claim {
            kind,
            value: value.into(),
        };
        if !self.claims.contains(&claim) {
            self.claims.push(claim);
        }
        self
    }

    /// Adds a claim when the value is present.
    pub fn claim_opt(self, kind: ClaimType, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.claim(kind, v),
            None => self,
        }
    }

    /// Adds one claim per value.
    pub fn claims<I, S>(self, kind: ClaimType, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values
            .into_iter()
            .fold(self, |builder, value| builder.claim(kind, value))
    }

    pub fn build(self) -> Principal {
        Principal {
            scheme: self.scheme,
            claims: self.claims,
        }
    }
}
