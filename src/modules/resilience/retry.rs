//! Bounded retry with exponential backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::core::config::ResilienceConfig;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    name: String,
    max_attempts: u32,
    initial_backoff: Duration,
    multiplier: f64,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(
        name: impl Into<String>,
        max_attempts: u32,
        initial_backoff: Duration,
        multiplier: f64,
        max_backoff: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            max_attempts: max_attempts.max(1),
            initial_backoff,
            multiplier: if multiplier.is_finite() {
                multiplier.max(1.0)
            } else {
                1.0
            },
            max_backoff,
        }
    }

    pub fn from_config(name: impl Into<String>, config: &ResilienceConfig) -> Self {
        Self::new(
            name,
            config.retry_max_attempts,
            config.retry_initial_backoff,
            config.retry_backoff_multiplier,
            config.retry_max_backoff,
        )
    }

    /// Delay before the attempt that follows attempt number `attempt` (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max_backoff.as_secs_f64() {
            return self.max_backoff;
        }
        Duration::from_secs_f64(secs)
    }

    /// Run `operation` until it succeeds, attempts run out, or `should_retry` refuses the error
    pub async fn run<F, Fut, T, E, R>(&self, mut operation: F, should_retry: R) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && should_retry(&e) => {
                    let delay = self.backoff_for(attempt);
                    warn!(
                        policy = %self.name,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(
            "test",
            max_attempts,
            Duration::from_millis(1),
            2.0,
            Duration::from_millis(5),
        )
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy::new(
            "test",
            5,
            Duration::from_millis(100),
            2.0,
            Duration::from_millis(350),
        );

        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(350));
        assert_eq!(policy.backoff_for(30), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy(0)
            .run(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("down".to_string())
                },
                |_| true,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result = policy(3)
            .run(
                || async {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 {
                        Err(format!("attempt {} failed", n))
                    } else {
                        Ok(n)
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy(2)
            .run(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("still down".to_string())
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap_err(), "still down");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy(5)
            .run(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("fatal".to_string())
                },
                |e| e != "fatal",
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
