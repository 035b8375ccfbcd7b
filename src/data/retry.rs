use std::time::Duration;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};

use super::{DataError, DataResult};

/// Retry a data-layer operation with exponential backoff and jitter.
///
/// Only errors classified retryable by `DataError::is_retryable()` are
/// retried; anything else fails on the first attempt. Errors carrying a
/// server-provided delay (rate limits) sleep for that long on top of the
/// strategy's backoff.
pub async fn retry_with_backoff<F, Fut, T>(operation: F, max_attempts: usize) -> DataResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = DataResult<T>>,
{
    let strategy = ExponentialBackoff::from_millis(250)
        .max_delay(Duration::from_secs(15))
        .map(jitter)
        .take(max_attempts);

    RetryIf::spawn(
        strategy,
        || async {
            match operation().await {
                Ok(result) => Ok(result),
                Err(e) => {
                    if e.is_retryable() {
                        if let Some(delay) = e.retry_delay() {
                            tracing::warn!("Retryable error: {} (waiting {}s)", e, delay);
                            tokio::time::sleep(Duration::from_secs(delay)).await;
                        } else {
                            tracing::warn!("Retryable error: {}", e);
                        }
                    } else {
                        tracing::error!("Non-retryable error: {}", e);
                    }
                    Err(e)
                }
            }
        },
        |e: &DataError| e.is_retryable(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let attempts = AtomicUsize::new(0);
        let result: DataResult<()> = retry_with_backoff(
            || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(DataError::Config("missing key".into()))
            },
            3,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retryable_eventually_succeeds() {
        let attempts = AtomicUsize::new(0);
        let result = retry_with_backoff(
            || async {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(DataError::api_error(503, "unavailable"))
                } else {
                    Ok(n)
                }
            },
            5,
        )
        .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_attempts_exhausted_returns_last_error() {
        let attempts = AtomicUsize::new(0);
        let result: DataResult<()> = retry_with_backoff(
            || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(DataError::api_error(502, "bad gateway"))
            },
            2,
        )
        .await;

        match result {
            Err(DataError::Api { status_code, .. }) => assert_eq!(status_code, 502),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
        // Initial attempt plus two retries
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
