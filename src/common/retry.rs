// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: usize, initial_delay: Duration) -> Self {
        Self {
            attempts,
            initial_delay,
        }
    }

    /// Single attempt, no backoff.
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Retry an async operation with exponential backoff while `retryable`
/// accepts the error. Non-retryable errors return immediately.
pub async fn retry_async_if<F, Fut, T, E, P>(
    label: &str,
    policy: RetryPolicy,
    mut op: F,
    retryable: P,
) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < attempts && retryable(&e) => {
                tracing::debug!(
                    target: "retry",
                    label,
                    attempt,
                    error = %e,
                    "Retrying after transient failure"
                );
                sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let counter = AtomicUsize::new(0);
        let res: Result<u32, String> = retry_async_if(
            "test",
            RetryPolicy::new(4, Duration::from_millis(1)),
            |_| {
                let current = counter.fetch_add(1, Ordering::Relaxed);
                async move {
                    if current < 2 {
                        Err("flaky".to_string())
                    } else {
                        Ok(7)
                    }
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(res.unwrap(), 7);
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let counter = AtomicUsize::new(0);
        let res: Result<u32, String> = retry_async_if(
            "test",
            RetryPolicy::new(5, Duration::from_millis(1)),
            |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                async { Err("reverted".to_string()) }
            },
            |e: &String| e.as_str() != "reverted",
        )
        .await;

        assert!(res.is_err());
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let counter = AtomicUsize::new(0);
        let res: Result<u32, String> = retry_async_if(
            "test",
            RetryPolicy::new(3, Duration::from_millis(1)),
            |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                async { Err("down".to_string()) }
            },
            |_| true,
        )
        .await;

        assert_eq!(res.unwrap_err(), "down");
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }
}
