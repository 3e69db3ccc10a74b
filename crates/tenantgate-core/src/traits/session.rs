//! Session store collaborator.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::result::AppResult;

/// Owns session lifecycle; the authorization core only asks questions.
///
/// Every call must honor `cancel`, returning a
/// [`Cancelled`](crate::error::ErrorKind::Cancelled) error once it fires.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Whether a session with this id exists.
    async fn is_valid_session_id(
        &self,
        session_id: &str,
        cancel: &CancellationToken,
    ) -> AppResult<bool>;

    /// Whether the session exists and was created for this fingerprint.
    async fn is_valid(
        &self,
        session_id: &str,
        fingerprint: &str,
        cancel: &CancellationToken,
    ) -> AppResult<bool>;

    /// Whether the session is bound to exactly this external user id and
    /// fingerprint.
    async fn is_user_valid(
        &self,
        session_id: &str,
        external_user_id: &str,
        fingerprint: &str,
        cancel: &CancellationToken,
    ) -> AppResult<bool>;
}
