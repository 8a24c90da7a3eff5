//! Exponential-backoff executor for calls to unreliable collaborators.
//!
//! An explicit state machine — attempt count and current delay — around
//! the operation: delay doubles per attempt, capped by `max_delay_ms`,
//! with optional symmetric jitter. Only errors marked retryable
//! ([`DomainError::is_retryable`]) are retried; exhausting the budget
//! re-surfaces the last failure unchanged. The backoff sleep is the only
//! suspension point and races the caller's cancellation token: a cancel
//! abandons the remaining attempts with [`DomainError::Cancelled`].
//!
//! Pure rule evaluation never goes through here — it cannot transiently
//! fail.

use crate::domain::error::DomainError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first (budget of 2 = 3 calls total).
    pub retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: Option<u64>,
    /// Symmetric jitter fraction of the current delay, e.g. 0.2 for ±20%.
    pub jitter: Option<f64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            base_delay_ms: 250,
            max_delay_ms: Some(5_000),
            jitter: Some(0.2),
        }
    }
}

impl RetryPolicy {
    /// No waiting at all — for tests and offline providers.
    pub fn none() -> Self {
        Self {
            retries: 0,
            base_delay_ms: 0,
            max_delay_ms: None,
            jitter: None,
        }
    }
}

pub async fn with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let mut attempt = 0u32;
    let mut delay_ms = policy.base_delay_ms;

    loop {
        if cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.retries => {
                let sleep_ms = jittered(delay_ms, policy.jitter);
                tokio::select! {
                    _ = cancel.cancelled() => return Err(DomainError::Cancelled),
                    _ = tokio::time::sleep(Duration::from_millis(sleep_ms)) => {}
                }
                attempt += 1;
                delay_ms = next_delay(delay_ms, policy.max_delay_ms);
            }
            Err(e) => return Err(e),
        }
    }
}

fn next_delay(current_ms: u64, max_ms: Option<u64>) -> u64 {
    let doubled = current_ms.saturating_mul(2);
    match max_ms {
        Some(cap) => doubled.min(cap),
        None => doubled,
    }
}

fn jittered(delay_ms: u64, jitter: Option<f64>) -> u64 {
    match jitter {
        Some(fraction) if fraction > 0.0 && delay_ms > 0 => {
            let spread = delay_ms as f64 * fraction;
            let offset = rand::thread_rng().gen_range(-spread..=spread);
            (delay_ms as f64 + offset).max(0.0).round() as u64
        }
        _ => delay_ms,
    }
}
