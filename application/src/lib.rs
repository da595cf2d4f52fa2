//! Application layer for llm-conclave.
//!
//! Orchestrates the domain model behind two entry points, the resilient
//! [`Gateway`] for one-shot requests and the [`CouncilOrchestrator`] for
//! multi-model deliberation, and defines the ports that infrastructure
//! adapters plug into.

pub mod cache;
pub mod council;
pub mod gateway;
pub mod health;
pub mod ports;
pub mod resilience;

// Re-export the main entry points
pub use cache::ResponseCache;
pub use council::{CouncilError, CouncilOrchestrator, CouncilRequest};
pub use gateway::{FallbackEvent, Gateway, GatewaySettings, GenerateRequest};
pub use health::{HealthMonitor, HealthObserver, HealthTable, MonitorSettings, ProbeTarget};
pub use ports::health_probe::{HealthProbe, ProbeError};
pub use ports::progress::{CouncilProgress, NoProgress};
pub use ports::responder::{GenerationRequest, Responder, ResponderError, ResponderReply};
pub use resilience::{CircuitBreaker, CircuitError, RetryPolicy};
