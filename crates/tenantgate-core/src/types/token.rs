//! Claims carried by a validated bearer token.

use serde::{Deserialize, Deserializer, Serialize};

/// Bearer token payload after signature, issuer and audience validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    #[serde(default)]
    pub exp: i64,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// External identity-provider object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    /// Platform user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<i64>,
    /// Offices the user belongs to.
    #[serde(default)]
    pub office_ids: Vec<i64>,
    /// Role names.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Extension claim promoted into role claims.
    #[serde(
        default,
        rename = "officePermissions",
        deserialize_with = "one_or_many"
    )]
    pub office_permissions: Vec<String>,
    /// Extension claim promoted into a role claim.
    #[serde(
        default,
        rename = "officeRole",
        skip_serializing_if = "Option::is_none"
    )]
    pub office_role: Option<String>,
    /// Derived from office-type membership by the token issuer.
    #[serde(default)]
    pub is_super_admin: bool,
    /// OAuth grant type the token was issued under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accepts a single string, a comma/semicolon separated string, or an array.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(values)) => values,
        Some(OneOrMany::One(value)) => value
            .split([',', ';'])
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect(),
    };
    Ok(values)
}
