//! Retry wrapper — bounded exponential backoff around the initiation of one
//! streaming generation call. Knows nothing about interview semantics; every
//! one of the four prompt types goes through it identically.
//!
//! Only errors classified transient by `LlmError::is_transient` are retried.
//! Mid-stream failures after a stream has been handed out are the caller's
//! problem; a request that cannot even start is ours.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::interview::InterviewError;
use crate::llm_client::{LlmError, TextStream};

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 2_000;
const MAX_DELAY_MS: u64 = 10_000;
const MAX_JITTER_MS: u64 = 1_000;

/// Invokes `factory` until it yields a stream, a non-transient error, or the
/// attempt budget is spent. If the cancellation token fires, aborts before
/// the next attempt instead of retrying.
pub async fn stream_with_retry<F, Fut>(
    factory: F,
    cancel: &CancellationToken,
) -> Result<TextStream, InterviewError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<TextStream, LlmError>>,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_ATTEMPTS {
        if cancel.is_cancelled() {
            return Err(InterviewError::Cancelled);
        }

        if attempt > 0 {
            let exponential = BASE_DELAY_MS.saturating_mul(1 << (attempt - 1));
            let jitter = rand::thread_rng().gen_range(0..=MAX_JITTER_MS);
            let delay = exponential.min(MAX_DELAY_MS) + jitter;
            warn!(
                "generation attempt {}/{} failed transiently, retrying in {}ms",
                attempt, MAX_ATTEMPTS, delay
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if cancel.is_cancelled() {
                return Err(InterviewError::Cancelled);
            }
        }

        match factory().await {
            Ok(stream) => return Ok(stream),
            Err(e) if e.is_transient() => last_error = Some(e),
            Err(e) => return Err(InterviewError::Llm(e)),
        }
    }

    Err(InterviewError::Llm(last_error.unwrap_or(
        LlmError::RateLimited {
            retries: MAX_ATTEMPTS,
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn empty_stream() -> TextStream {
        Box::pin(futures_util::stream::iter(Vec::<Result<String, LlmError>>::new()))
    }

    fn transient_error() -> LlmError {
        LlmError::Api {
            status: 429,
            message: "resource exhausted".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let result = stream_with_retry(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(transient_error())
                    } else {
                        Ok(empty_stream())
                    }
                }
            },
            &cancel,
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_propagates_immediately() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let result = stream_with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(LlmError::Api {
                        status: 400,
                        message: "bad request".to_string(),
                    })
                }
            },
            &cancel,
        )
        .await;
        assert!(matches!(
            result,
            Err(InterviewError::Llm(LlmError::Api { status: 400, .. }))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_transient_error() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let result = stream_with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient_error()) }
            },
            &cancel,
        )
        .await;
        assert!(matches!(
            result,
            Err(InterviewError::Llm(LlmError::Api { status: 429, .. }))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_cancellation_aborts_without_calling() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = stream_with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(empty_stream()) }
            },
            &cancel,
        )
        .await;
        assert!(matches!(result, Err(InterviewError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
