//! Cooperative cancellation for storage operations
//!
//! Adapters call [`ensure_active`] before touching the backend and wrap each backend round-trip
//! in [`run_cancellable`], which drops the in-flight future as soon as the token fires.
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::Error;

/// Fail with [`Error::Cancelled`] if the token has already fired.
pub fn ensure_active(cancel: &CancellationToken) -> Result<(), Error> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Run a backend operation unless, or until, the token is cancelled.
///
/// The operation is never polled when the token is already cancelled.
pub async fn run_cancellable<F, T>(cancel: &CancellationToken, operation: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    ensure_active(cancel)?;

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = operation => result,
    }
}
