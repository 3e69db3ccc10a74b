//! Builds hashed partition keys for one request.

use tenantgate_core::types::{Principal, RequestContext, ThrottlingContext, headers};

use crate::crypto::ShortHasher;

/// Derives [`ThrottlingContext`] keys from request attributes.
///
/// Every key passes through the peppered short hash; raw fingerprints and
/// addresses are never returned.
#[derive(Debug, Clone, Default)]
pub struct PartitionKeyBuilder {
    hasher: ShortHasher,
}

impl PartitionKeyBuilder {
    pub fn new(hasher: ShortHasher) -> Self {
        Self { hasher }
    }

    /// Short hash of a fingerprint, safe to log.
    pub fn fingerprint_hash(&self, fingerprint: &str) -> String {
        self.hasher.hash(fingerprint)
    }

    /// Keys for the user, fingerprint and composite partitions.
    ///
    /// The user partition is present only when the principal carries an
    /// external identity id.
    pub fn build(
        &self,
        principal: Option<&Principal>,
        request: &RequestContext,
        fingerprint: &str,
    ) -> ThrottlingContext {
        let fingerprint_key = self.fingerprint_hash(fingerprint);
        let user_key = principal
            .and_then(Principal::external_id)
            .map(|id| self.hasher.hash(id));

        let composite = format!(
            "{}|{}|{}|{}",
            request.client_ip(),
            request.header(headers::USER_AGENT).unwrap_or_default(),
            request.header(headers::ACCEPT_LANGUAGE).unwrap_or_default(),
            fingerprint_key,
        );

        ThrottlingContext {
            user_key,
            composite_key: self.hasher.hash(&composite),
            fingerprint_key,
        }
    }
}
