//! Retry wrapper: backoff timing, exhaustion, cancellation.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tradetrail::domain::error::DomainError;
use tradetrail::infrastructure::retry::{with_backoff, RetryPolicy};

fn policy(retries: u32, base_delay_ms: u64) -> RetryPolicy {
    RetryPolicy {
        retries,
        base_delay_ms,
        max_delay_ms: None,
        jitter: None,
    }
}

#[tokio::test]
async fn test_exhaustion_surfaces_the_original_error() {
    let attempts = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();
    let start = Instant::now();

    let counter = attempts.clone();
    let result: Result<(), _> = with_backoff(&policy(2, 50), &cancel, || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::Transient("upstream 503".into()))
        }
    })
    .await;

    // Budget of 2 retries = 3 calls; waits of base + 2×base before jitter.
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(140), "waited {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1_000), "waited {elapsed:?}");

    match result {
        Err(DomainError::Transient(msg)) => assert_eq!(msg, "upstream 503"),
        other => panic!("expected the original transient error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let attempts = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();

    let counter = attempts.clone();
    let result = with_backoff(&policy(3, 5), &cancel, || {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(DomainError::Transient("hiccup".into()))
            } else {
                Ok(42)
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_non_retryable_errors_fail_fast() {
    let attempts = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();
    let start = Instant::now();

    let counter = attempts.clone();
    let result: Result<(), _> = with_backoff(&policy(5, 1_000), &cancel, || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::NotFound("no such pool".into()))
        }
    })
    .await;

    assert!(matches!(result, Err(DomainError::NotFound(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn test_cancellation_mid_backoff_abandons_retries() {
    let cancel = CancellationToken::new();
    let start = Instant::now();

    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        })
    };

    // Base delay far longer than the cancel timer — the sleep must be
    // interrupted, not awaited out.
    let result: Result<(), _> = with_backoff(&policy(3, 30_000), &cancel, || async {
        Err(DomainError::Transient("down".into()))
    })
    .await;

    assert!(matches!(result, Err(DomainError::Cancelled)));
    assert!(start.elapsed() < Duration::from_secs(2));
    handle.await.unwrap();
}

#[tokio::test]
async fn test_already_cancelled_never_invokes_the_operation() {
    let attempts = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let counter = attempts.clone();
    let result: Result<(), _> = with_backoff(&policy(3, 10), &cancel, || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
    .await;

    assert!(matches!(result, Err(DomainError::Cancelled)));
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
}
