//! Resilience primitives: circuit breaking and retries.

pub mod breaker;
pub mod retry;

pub use breaker::{CircuitBreaker, CircuitError};
pub use retry::RetryPolicy;
