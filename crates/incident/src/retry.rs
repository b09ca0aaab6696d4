use primitives::retries::retry_with_backoff_if;
use reqwest::{Error as ReqwestError, StatusCode};

use crate::error::FetchError;

/// Determine if a reqwest error is worth another attempt.
pub fn is_retryable_http(err: &ReqwestError) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    if let Some(status) = err.status() {
        return status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
    }
    false
}

/// Determine if a fetch error is retryable. Authentication and parse failures
/// never are.
fn is_retryable(err: &FetchError) -> bool {
    match err {
        FetchError::Transport(e) => is_retryable_http(e),
        _ => false,
    }
}

/// Retry the provided async operation with exponential backoff if the returned
/// error is considered retryable.
pub(crate) async fn retry_op<F, Fut, T>(op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, FetchError>>,
{
    retry_with_backoff_if(op, is_retryable).await
}
