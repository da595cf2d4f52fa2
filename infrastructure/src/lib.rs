//! Infrastructure layer for llm-conclave
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration file loading, the HTTP responder
//! adapters and the health probe.

pub mod config;
pub mod probe;
pub mod responders;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig};
pub use probe::{HttpHealthProbe, probe_targets};
pub use responders::{
    HttpChatResponder, LocalResponder, ResponderBuildError, build_responders,
};
