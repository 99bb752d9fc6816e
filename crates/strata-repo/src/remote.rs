//! Helpers shared by every remote call the engine makes.

use std::future::Future;
use std::time::Duration;

use crate::error::{ProviderError, RepoError, Result};
use crate::provider::ProviderResult;

/// Runs a provider call, failing with [`ProviderError::Timeout`] if it
/// does not finish within `timeout`.
///
/// The inner future is dropped on timeout, which cancels the request.
pub(crate) async fn bounded<T, F>(timeout: Duration, call: F) -> ProviderResult<T>
where
    F: Future<Output = ProviderResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout { elapsed: timeout }),
    }
}

/// Attaches operation context to a provider result.
pub(crate) trait ProviderResultExt<T> {
    fn context(self, operation: &'static str, path: &str) -> Result<T>;
}

impl<T> ProviderResultExt<T> for ProviderResult<T> {
    fn context(self, operation: &'static str, path: &str) -> Result<T> {
        self.map_err(|e| RepoError::provider(operation, path, e))
    }
}

/// Converts a failed sub-task join into an engine error.
pub(crate) fn join_failure(
    operation: &'static str,
    path: &str,
    err: tokio::task::JoinError,
) -> RepoError {
    RepoError::provider(
        operation,
        path,
        ProviderError::Transport(format!("task did not complete: {}", err)),
    )
}
