//! Ports (interfaces) for external dependencies.
//!
//! - [`responder`] - LLM responder adapters
//! - [`health_probe`] - endpoint reachability checks
//! - [`progress`] - council progress reporting

pub mod health_probe;
pub mod progress;
pub mod responder;

pub use health_probe::{HealthProbe, ProbeError};
pub use progress::{CouncilProgress, NoProgress};
pub use responder::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenerationRequest, Responder, ResponderError,
    ResponderReply,
};
