//! Core traits defined in `tenantgate-core` and implemented by other crates
//! or by the host application.

pub mod cache;
pub mod identity;
pub mod session;
pub mod throttling;
pub mod token;

pub use cache::CacheProvider;
pub use identity::IdentityService;
pub use session::SessionStore;
pub use throttling::ThrottlingStore;
pub use token::TokenValidator;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::result::AppResult;

/// Races a collaborator call against the request's cancellation signal.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::cancelled("request cancelled")),
        result = fut => result,
    }
}
