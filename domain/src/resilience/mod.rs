//! Resilience primitives: the circuit breaker state machine and the retry
//! backoff law. Both are pure; their async shells live in the application
//! layer.

pub mod breaker;
pub mod retry;

pub use breaker::{BreakerCore, BreakerSettings, BreakerSnapshot, BreakerState};
pub use retry::BackoffStrategy;
