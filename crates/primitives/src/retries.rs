use std::{
    future::Future,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use tokio_retry::{RetryIf, strategy::ExponentialBackoff};
use tracing::debug;

/// The default maximum number of retries for a retryable error.
///
/// A run is expected to finish well before the next scheduler tick, so the
/// total backoff stays under two seconds.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// The base of the exponential backoff, in milliseconds.
const BACKOFF_BASE_MS: u64 = 2;

/// Multiplier applied to each backoff step: 200ms, 400ms, 800ms.
const BACKOFF_FACTOR: u64 = 100;

/// Upper bound for a single backoff step.
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// A retry strategy trait.
pub trait Strategy: Iterator<Item = Duration> + Clone + Send + Sync + 'static {}

/// Implement the Strategy trait for any type that is an iterator of Durations (i.e. all backoffs
/// exported by `tokio_retry`)
impl<T> Strategy for T where T: Iterator<Item = Duration> + Clone + Send + Sync + 'static {}

/// The default [`ExponentialBackoff`] used by [`retry_with_backoff_if`].
pub fn default_backoff() -> impl Strategy {
    ExponentialBackoff::from_millis(BACKOFF_BASE_MS)
        .factor(BACKOFF_FACTOR)
        .max_delay(MAX_BACKOFF)
        .take(DEFAULT_MAX_RETRIES)
}

/// Retry the provided async operation using [`default_backoff`].
///
/// Retries are attempted as long as the provided `condition` returns `true` for
/// the error produced by the operation, up to [`DEFAULT_MAX_RETRIES`] times.
pub async fn retry_with_backoff_if<F, Fut, T, E, C>(op: F, condition: C) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
{
    retry_with_strategy_if(default_backoff(), op, condition).await
}

/// Retry the provided async operation with an explicit backoff `strategy`.
pub async fn retry_with_strategy_if<S, F, Fut, T, E, C>(
    strategy: S,
    op: F,
    condition: C,
) -> Result<T, E>
where
    S: Strategy,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
{
    let attempts = AtomicU32::new(0);
    RetryIf::spawn(strategy, op, |err: &E| {
        let retry = condition(err);
        if retry {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(attempt, "retryable error, backing off");
        }
        retry
    })
    .await
}
