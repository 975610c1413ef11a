//! Cancellation-aware waiting.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::RociError;

/// Drive `future` to completion unless `cancel` fires first.
///
/// An already-cancelled token wins without polling `future`. The losing
/// future is dropped before this returns.
pub async fn run_with_cancel<T, F>(
    cancel: Option<&CancellationToken>,
    future: F,
) -> Result<T, RociError>
where
    F: Future<Output = Result<T, RociError>>,
{
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(RociError::Cancelled),
                result = future => result,
            }
        }
        None => future.await,
    }
}

/// Sleep for `duration`, returning [`RociError::Cancelled`] as soon as
/// `cancel` fires.
pub async fn sleep_with_cancel(
    duration: Duration,
    cancel: Option<&CancellationToken>,
) -> Result<(), RociError> {
    run_with_cancel(cancel, async {
        tokio::time::sleep(duration).await;
        Ok(())
    })
    .await
}
