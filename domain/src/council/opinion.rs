//! Council stage artifacts

use serde::{Deserialize, Serialize};

/// The three protocol stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    FirstOpinions,
    PeerReview,
    Synthesis,
}

impl Stage {
    /// Get the string identifier for this stage
    pub fn as_str(&self) -> &str {
        match self {
            Stage::FirstOpinions => "first-opinions",
            Stage::PeerReview => "peer-review",
            Stage::Synthesis => "synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One participant's stage-1 answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    pub responder: String,
    pub text: String,
}

impl Opinion {
    pub fn new(responder: impl Into<String>, text: impl Into<String>) -> Self {
        Self { responder: responder.into(), text: text.into() }
    }
}

/// One participant's stage-2 review of the other opinions.
///
/// `rankings[j]` is the rank (1 = best) the reviewer gave the j-th opinion
/// of the list shown to them; the orchestrator maps shown positions back to
/// original opinions through the label map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub reviewer: String,
    pub rankings: Vec<usize>,
    pub reasoning: String,
    pub confidence: f64,
}

impl ReviewResult {
    pub fn new(
        reviewer: impl Into<String>,
        rankings: Vec<usize>,
        reasoning: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            reviewer: reviewer.into(),
            rankings,
            reasoning: reasoning.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Stand-in for a reviewer that failed or produced unparseable output:
    /// identity ranking over the shown list, zero confidence.
    pub fn degraded(reviewer: impl Into<String>, shown_count: usize, reason: impl Into<String>) -> Self {
        Self {
            reviewer: reviewer.into(),
            rankings: (1..=shown_count).collect(),
            reasoning: reason.into(),
            confidence: 0.0,
        }
    }
}

/// The chairman's (or fallback's) final word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub text: String,
    pub rationale: String,
    pub confidence: f64,
}

impl SynthesisResult {
    pub fn new(text: impl Into<String>, rationale: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            rationale: rationale.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Run accounting surfaced with every council result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilMetadata {
    pub council_size: usize,
    pub chairman: String,
    pub latency_ms: u64,
    /// Total responder calls relative to a single gateway call
    pub cost_multiplier: usize,
}

/// Terminal artifact of a council run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilResponse {
    pub answer: String,
    pub opinions: Vec<Opinion>,
    /// None when reviews were disabled for the run
    pub reviews: Option<Vec<ReviewResult>>,
    pub rationale: String,
    pub confidence: f64,
    pub metadata: CouncilMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_review_is_identity_with_zero_confidence() {
        let review = ReviewResult::degraded("gigachat", 3, "reviewer call failed");
        assert_eq!(review.rankings, vec![1, 2, 3]);
        assert_eq!(review.confidence, 0.0);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(ReviewResult::new("r", vec![1], "", 1.7).confidence, 1.0);
        assert_eq!(ReviewResult::new("r", vec![1], "", -0.2).confidence, 0.0);
        assert_eq!(SynthesisResult::new("t", "r", 2.0).confidence, 1.0);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::FirstOpinions.to_string(), "first-opinions");
        assert_eq!(Stage::PeerReview.as_str(), "peer-review");
        assert_eq!(Stage::Synthesis.as_str(), "synthesis");
    }
}
