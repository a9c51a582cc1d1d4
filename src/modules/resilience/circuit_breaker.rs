//! # Circuit Breaker
//!
//! Three states: Closed (calls pass), Open (calls fail fast) and Half-Open (a few trial
//! calls decide whether the dependency has recovered).
//!
//! The breaker trips on failure *rate*: once at least `minimum_calls` outcomes sit in the
//! sliding window of the last `sliding_window_size` calls, a failure share at or above
//! `failure_rate_threshold` percent opens the circuit for `open_duration`. After that the
//! next `permitted_half_open_calls` calls are let through; all of them succeeding closes
//! the circuit, any failure reopens it.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::core::config::ResilienceConfig;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Open,
        }
    }
}

/// Errors returned by [`CircuitBreaker::call`]
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open, the operation was not attempted
    #[error("Circuit breaker is open for {component}")]
    CircuitOpen { component: String },

    /// Operation ran and failed; the failure was recorded
    #[error("Operation failed: {0}")]
    OperationFailed(E),
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Percentage (0-100) of failures in the window that opens the circuit
    pub failure_rate_threshold: f64,
    pub sliding_window_size: usize,
    /// Outcomes required in the window before the rate is evaluated
    pub minimum_calls: usize,
    pub open_duration: Duration,
    pub permitted_half_open_calls: u32,
}

impl From<&ResilienceConfig> for CircuitBreakerConfig {
    fn from(config: &ResilienceConfig) -> Self {
        Self {
            failure_rate_threshold: config.breaker_failure_rate_threshold,
            sliding_window_size: config.breaker_sliding_window_size.max(1),
            minimum_calls: config.breaker_minimum_calls.max(1),
            open_duration: config.breaker_open_duration,
            permitted_half_open_calls: config.breaker_half_open_calls.max(1),
        }
    }
}

#[derive(Debug, Default)]
struct BreakerWindow {
    /// `true` for success, oldest first
    outcomes: VecDeque<bool>,
    opened_at: Option<Instant>,
    /// Bumped on every transition to half-open so stale permits can be told apart
    half_open_epoch: u64,
    half_open_admitted: u32,
    half_open_successes: u32,
}

impl BreakerWindow {
    fn failure_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let failures = self.outcomes.iter().filter(|ok| !**ok).count();
        failures as f64 * 100.0 / self.outcomes.len() as f64
    }
}

#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    /// Mirrors the state held under `window` so `state()` stays lock-free
    state: AtomicU8,
    config: CircuitBreakerConfig,
    window: Mutex<BreakerWindow>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        info!(
            component = %name,
            failure_rate_threshold = config.failure_rate_threshold,
            sliding_window_size = config.sliding_window_size,
            open_duration_secs = config.open_duration.as_secs(),
            "Circuit breaker initialized"
        );

        Self {
            name,
            state: AtomicU8::new(CircuitState::Closed as u8),
            config,
            window: Mutex::new(BreakerWindow::default()),
        }
    }

    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    /// Run `operation` under breaker protection.
    ///
    /// A call dropped before `operation` completes records no outcome; if it held a
    /// half-open slot the slot is released for the next caller.
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(permit) = self.try_acquire() else {
            debug!(component = %self.name, "Call rejected, circuit open");
            return Err(CircuitBreakerError::CircuitOpen {
                component: self.name.clone(),
            });
        };

        let result = operation().await;
        permit.complete(result.is_ok());

        result.map_err(CircuitBreakerError::OperationFailed)
    }

    fn lock_window(&self) -> MutexGuard<'_, BreakerWindow> {
        // The window holds plain counters, so a poisoned lock still has usable state
        self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn try_acquire(&self) -> Option<CallPermit<'_>> {
        let mut window = self.lock_window();
        let half_open_epoch = match self.state() {
            CircuitState::Closed => None,
            CircuitState::Open => {
                let cooled_down = window
                    .opened_at
                    .map(|opened| opened.elapsed() >= self.config.open_duration)
                    .unwrap_or(true);
                if !cooled_down {
                    return None;
                }
                self.transition_to_half_open(&mut window);
                window.half_open_admitted += 1;
                Some(window.half_open_epoch)
            }
            CircuitState::HalfOpen => {
                if window.half_open_admitted >= self.config.permitted_half_open_calls {
                    return None;
                }
                window.half_open_admitted += 1;
                Some(window.half_open_epoch)
            }
        };

        Some(CallPermit {
            breaker: self,
            half_open_epoch,
            completed: false,
        })
    }

    fn record_success(&self) {
        let mut window = self.lock_window();
        match self.state() {
            CircuitState::Closed => self.push_outcome(&mut window, true),
            CircuitState::HalfOpen => {
                window.half_open_successes += 1;
                if window.half_open_successes >= self.config.permitted_half_open_calls {
                    self.transition_to_closed(&mut window);
                }
            }
            // A call admitted before the circuit opened finished late
            CircuitState::Open => {}
        }
    }

    fn record_failure(&self) {
        let mut window = self.lock_window();
        match self.state() {
            CircuitState::Closed => {
                self.push_outcome(&mut window, false);
                if window.outcomes.len() >= self.config.minimum_calls
                    && window.failure_rate() >= self.config.failure_rate_threshold
                {
                    self.transition_to_open(&mut window);
                }
            }
            CircuitState::HalfOpen => self.transition_to_open(&mut window),
            CircuitState::Open => {}
        }
    }

    /// Give back a half-open slot whose call never finished
    fn release_half_open_slot(&self, epoch: u64) {
        let mut window = self.lock_window();
        if self.state() == CircuitState::HalfOpen && window.half_open_epoch == epoch {
            window.half_open_admitted = window.half_open_admitted.saturating_sub(1);
            debug!(component = %self.name, "Half-open call abandoned, slot released");
        }
    }

    fn push_outcome(&self, window: &mut BreakerWindow, success: bool) {
        window.outcomes.push_back(success);
        while window.outcomes.len() > self.config.sliding_window_size {
            window.outcomes.pop_front();
        }
    }

    fn transition_to_closed(&self, window: &mut BreakerWindow) {
        self.state.store(CircuitState::Closed as u8, Ordering::Release);
        window.outcomes.clear();
        window.opened_at = None;
        window.half_open_admitted = 0;
        window.half_open_successes = 0;

        info!(component = %self.name, "Circuit breaker closed (recovered)");
    }

    fn transition_to_open(&self, window: &mut BreakerWindow) {
        let failure_rate = window.failure_rate();
        self.state.store(CircuitState::Open as u8, Ordering::Release);
        window.opened_at = Some(Instant::now());
        window.half_open_admitted = 0;
        window.half_open_successes = 0;

        error!(
            component = %self.name,
            failure_rate = failure_rate,
            threshold = self.config.failure_rate_threshold,
            open_duration_secs = self.config.open_duration.as_secs(),
            "Circuit breaker opened (failing fast)"
        );
    }

    fn transition_to_half_open(&self, window: &mut BreakerWindow) {
        self.state
            .store(CircuitState::HalfOpen as u8, Ordering::Release);
        window.half_open_epoch += 1;
        window.half_open_admitted = 0;
        window.half_open_successes = 0;

        info!(
            component = %self.name,
            permitted_calls = self.config.permitted_half_open_calls,
            "Circuit breaker half-open (testing recovery)"
        );
    }
}

/// Admission to run one call; records the outcome once the call completes
struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    /// Set when the call was admitted while half-open
    half_open_epoch: Option<u64>,
    completed: bool,
}

impl CallPermit<'_> {
    fn complete(mut self, success: bool) {
        self.completed = true;
        if success {
            self.breaker.record_success();
        } else {
            self.breaker.record_failure();
        }
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        if let Some(epoch) = self.half_open_epoch {
            self.breaker.release_half_open_slot(epoch);
        }
    }
}
