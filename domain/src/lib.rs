//! Domain layer for llm-conclave
//!
//! This crate contains the core types, state machines and council logic.
//! It has no dependencies on infrastructure or presentation concerns and
//! performs no I/O; apart from the label shuffle, time and randomness are
//! always passed in by the caller.
//!
//! # Core Concepts
//!
//! ## Gateway
//!
//! A gateway call walks a priority-ordered responder chain (cache, health
//! filter, circuit breaker, timeout, fallback, offline) and always
//! resolves to a [`gateway::GatewayResponse`].
//!
//! ## Council
//!
//! The council is the three-stage consensus protocol: parallel first
//! opinions, then anonymized peer ranking, then a chairman synthesis with
//! a deterministic rank-aggregation fallback.

pub mod core;
pub mod council;
pub mod gateway;
pub mod health;
pub mod prompt;
pub mod registry;
pub mod resilience;
pub mod util;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    query::Query,
    role::Role,
    validation::{ConfigIssue, Severity},
};
pub use council::{
    CouncilConfig, CouncilMetadata, CouncilResponse, LabelMap, MAX_COUNCIL_SIZE, MIN_COUNCIL_SIZE,
    Opinion, RankTally, RankingParse, ReviewResult, Stage, SynthesisResult, aggregate_rankings,
    best_opinion, parse_review_response,
};
pub use gateway::{CacheKey, GatewayResponse, ResponseMetadata, TokenUsage};
pub use health::{HealthStatus, HealthThresholds, ResponderHealth};
pub use prompt::CouncilPrompts;
pub use registry::{FallbackChain, ResponderConfig, ResponderRegistry};
pub use resilience::{BackoffStrategy, BreakerCore, BreakerSettings, BreakerSnapshot, BreakerState};
