//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid council size: {size} (allowed {min}..={max})")]
    InvalidCouncilSize { size: usize, min: usize, max: usize },

    #[error("Unknown responder: {0}")]
    UnknownResponder(String),

    #[error("Unknown backoff strategy: {0}")]
    UnknownStrategy(String),
}

impl DomainError {
    /// Check if this error is a council size violation
    pub fn is_size_violation(&self) -> bool {
        matches!(self, DomainError::InvalidCouncilSize { .. })
    }
}
