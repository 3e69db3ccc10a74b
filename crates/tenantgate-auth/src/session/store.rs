//! Session records kept in the shared cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use tenantgate_cache::CacheManager;
use tenantgate_cache::keys;
use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::{CacheProvider, SessionStore, cancellable};

use crate::crypto::{constant_time_eq, sha256_hex};

/// Persisted session. The fingerprint is stored only as a digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    fingerprint_hash: String,
    external_user_id: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionRecord {
    fn matches_fingerprint(&self, fingerprint: &str) -> bool {
        constant_time_eq(
            self.fingerprint_hash.as_bytes(),
            sha256_hex(fingerprint).as_bytes(),
        )
    }
}

/// [`SessionStore`] over the shared cache.
#[derive(Debug, Clone)]
pub struct CachedSessionStore {
    cache: Arc<CacheManager>,
}

impl CachedSessionStore {
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }

    /// Opens an anonymous session for a device fingerprint; returns its id.
    pub async fn create_session(&self, fingerprint: &str, ttl: Duration) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(ttl)
                .map_err(|e| AppError::validation(format!("Invalid session TTL: {e}")))?;
        let record = SessionRecord {
            fingerprint_hash: sha256_hex(fingerprint),
            external_user_id: None,
            created_at: now,
            expires_at,
        };
        self.cache.set_json(&keys::session(&id), &record, ttl).await?;
        info!(session_id = %id, ttl_seconds = ttl.as_secs(), "Session created");
        Ok(id)
    }

    /// Binds an existing session to an external user id, keeping its expiry.
    pub async fn bind_user(&self, session_id: &str, external_user_id: &str) -> AppResult<()> {
        let key = keys::session(session_id);
        let mut record = self
            .load(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session {session_id} not found")))?;

        let remaining = (record.expires_at - Utc::now())
            .to_std()
            .map_err(|_| AppError::not_found(format!("Session {session_id} has expired")))?;
        record.external_user_id = Some(external_user_id.to_string());
        self.cache.set_json(&key, &record, remaining).await?;
        info!(session_id, "Session bound to user");
        Ok(())
    }

    /// Deletes a session.
    pub async fn revoke(&self, session_id: &str) -> AppResult<()> {
        self.cache.delete(&keys::session(session_id)).await?;
        info!(session_id, "Session revoked");
        Ok(())
    }

    async fn load(&self, session_id: &str) -> AppResult<Option<SessionRecord>> {
        if session_id.trim().is_empty() {
            return Ok(None);
        }
        let record: Option<SessionRecord> = self.cache.get_json(&keys::session(session_id)).await?;
        Ok(record.filter(|r| r.expires_at > Utc::now()))
    }
}

#[async_trait]
impl SessionStore for CachedSessionStore {
    async fn is_valid_session_id(
        &self,
        session_id: &str,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        cancellable(cancel, async { Ok(self.load(session_id).await?.is_some()) }).await
    }

    async fn is_valid(
        &self,
        session_id: &str,
        fingerprint: &str,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        cancellable(cancel, async {
            let valid = self
                .load(session_id)
                .await?
                .is_some_and(|record| record.matches_fingerprint(fingerprint));
            debug!(session_id, valid, "Anonymous session checked");
            Ok(valid)
        })
        .await
    }

    async fn is_user_valid(
        &self,
        session_id: &str,
        external_user_id: &str,
        fingerprint: &str,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        cancellable(cancel, async {
            let valid = self.load(session_id).await?.is_some_and(|record| {
                let user_matches = record
                    .external_user_id
                    .as_deref()
                    .is_some_and(|bound| constant_time_eq(bound.as_bytes(), external_user_id.as_bytes()));
                user_matches && record.matches_fingerprint(fingerprint)
            });
            debug!(session_id, valid, "User session checked");
            Ok(valid)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CachedSessionStore {
        CachedSessionStore::new(Arc::new(CacheManager::in_memory()))
    }

    #[tokio::test]
    async fn test_anonymous_session_lifecycle() {
        let store = store();
        let cancel = CancellationToken::new();
        let id = store.create_session("fp1", Duration::from_secs(60)).await.unwrap();

        assert!(store.is_valid_session_id(&id, &cancel).await.unwrap());
        assert!(store.is_valid(&id, "fp1", &cancel).await.unwrap());
        assert!(!store.is_valid(&id, "fp2", &cancel).await.unwrap());
        assert!(!store.is_valid("missing", "fp1", &cancel).await.unwrap());

        store.revoke(&id).await.unwrap();
        assert!(!store.is_valid_session_id(&id, &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_binding_requires_same_user_and_fingerprint() {
        let store = store();
        let cancel = CancellationToken::new();
        let id = store.create_session("fp1", Duration::from_secs(60)).await.unwrap();

        assert!(!store.is_user_valid(&id, "oid-1", "fp1", &cancel).await.unwrap());
        store.bind_user(&id, "oid-1").await.unwrap();

        assert!(store.is_user_valid(&id, "oid-1", "fp1", &cancel).await.unwrap());
        assert!(!store.is_user_valid(&id, "oid-2", "fp1", &cancel).await.unwrap());
        assert!(!store.is_user_valid(&id, "oid-1", "fp2", &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_bind_unknown_session_fails() {
        let err = store().bind_user("nope", "oid").await.unwrap_err();
        assert_eq!(err.kind, tenantgate_core::error::ErrorKind::NotFound);
    }
}
