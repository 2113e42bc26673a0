//! Deadlines for calls to external collaborators.

use std::{future::Future, time::Duration};

use tracing::trace;

use crate::error::ExternalError;

/// Runs `fut` with a deadline of `limit`.
///
/// Errors from the future are converted into [`ExternalError`]; an expired
/// deadline becomes [`ExternalError::TimedOut`]. The future is dropped on
/// timeout, which cancels the in-flight call.
pub async fn within<F, T, E>(limit: Duration, fut: F) -> Result<T, ExternalError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<ExternalError>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            trace!(?limit, "Deadline elapsed");
            Err(ExternalError::TimedOut(limit))
        }
    }
}
