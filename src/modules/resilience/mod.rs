//! Resilience policies for calls to dependencies that may be unavailable
//!
//! - **Circuit breaker**: stops calling a failing dependency for a cool-down period
//! - **Retry**: bounded attempts with exponential backoff
//!
//! Both are plain objects applied around a call; the caller decides what the fallback is.

mod circuit_breaker;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
pub use retry::RetryPolicy;
