//! Identity and permission lookup collaborator.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::result::AppResult;
use crate::types::Principal;

/// Answers office-membership and permission questions for a principal.
#[async_trait]
pub trait IdentityService: Send + Sync + std::fmt::Debug {
    /// Whether the principal is a member of the office.
    async fn validate_office_membership(
        &self,
        principal: &Principal,
        office_id: i64,
        cancel: &CancellationToken,
    ) -> AppResult<bool>;

    /// Permission names the user holds within the office.
    async fn get_user_permissions(
        &self,
        user_id: Option<i64>,
        office_id: i64,
        cancel: &CancellationToken,
    ) -> AppResult<HashSet<String>>;
}
