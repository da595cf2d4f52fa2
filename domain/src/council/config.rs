//! Council configuration value object

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::DomainError;

/// Smallest council that can still cross-review
pub const MIN_COUNCIL_SIZE: usize = 2;
/// Largest council before cost and latency stop paying off
pub const MAX_COUNCIL_SIZE: usize = 7;

const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for one council run (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilConfig {
    /// Responder names taking part in stages 1 and 2
    pub participants: Vec<String>,
    /// Responder that produces the final synthesis
    pub chairman: String,
    /// Deadline applied to each stage independently
    pub stage_timeout: Duration,
    /// Whether stage 2 runs and reviews appear in the result
    pub include_reviews: bool,
}

impl CouncilConfig {
    pub fn new(participants: Vec<String>, chairman: impl Into<String>) -> Self {
        Self {
            participants,
            chairman: chairman.into(),
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            include_reviews: true,
        }
    }

    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    pub fn without_reviews(mut self) -> Self {
        self.include_reviews = false;
        self
    }

    /// Enforce the size bounds. The chairman is intentionally not required
    /// to participate; that case is only worth a warning at the call site.
    pub fn validate(&self) -> Result<(), DomainError> {
        let size = self.participants.len();
        if !(MIN_COUNCIL_SIZE..=MAX_COUNCIL_SIZE).contains(&size) {
            return Err(DomainError::InvalidCouncilSize {
                size,
                min: MIN_COUNCIL_SIZE,
                max: MAX_COUNCIL_SIZE,
            });
        }
        Ok(())
    }

    pub fn chairman_participates(&self) -> bool {
        self.participants.iter().any(|p| p == &self.chairman)
    }

    /// Every participant answers once, the chairman synthesizes once
    pub fn cost_multiplier(&self) -> usize {
        self.participants.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("responder-{i}")).collect()
    }

    #[test]
    fn test_valid_sizes() {
        assert!(CouncilConfig::new(names(2), "responder-0").validate().is_ok());
        assert!(CouncilConfig::new(names(7), "responder-0").validate().is_ok());
    }

    #[test]
    fn test_too_small() {
        let err = CouncilConfig::new(names(1), "responder-0").validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidCouncilSize { size: 1, min: 2, max: 7 }));
    }

    #[test]
    fn test_too_large() {
        let err = CouncilConfig::new(names(8), "responder-0").validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidCouncilSize { size: 8, .. }));
    }

    #[test]
    fn test_chairman_participation() {
        let config = CouncilConfig::new(names(3), "responder-1");
        assert!(config.chairman_participates());
        let outsider = CouncilConfig::new(names(3), "external");
        assert!(!outsider.chairman_participates());
        // An outside chairman is allowed, only the size is validated
        assert!(outsider.validate().is_ok());
    }

    #[test]
    fn test_cost_multiplier_counts_chairman() {
        assert_eq!(CouncilConfig::new(names(3), "responder-0").cost_multiplier(), 4);
        assert_eq!(CouncilConfig::new(names(7), "external").cost_multiplier(), 8);
    }
}
