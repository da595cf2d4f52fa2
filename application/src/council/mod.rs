//! Three-stage council orchestration.
//!
//! Stage 1 gathers independent opinions from every participant in parallel.
//! Stage 2 shows each participant the other opinions, anonymized through a
//! shared label map, and collects rankings. Stage 3 asks the chairman for a
//! synthesis, falling back to the best peer-ranked opinion when the chairman
//! cannot deliver. A run degrades wherever it can; only a bad configuration
//! or a starved stage 1 aborts it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use conclave_domain::{
    CouncilConfig, CouncilMetadata, CouncilPrompts, CouncilResponse, DomainError, LabelMap,
    MIN_COUNCIL_SIZE, Opinion, Query, RankTally, RankingParse, ReviewResult, Stage,
    SynthesisResult, aggregate_rankings, best_opinion, parse_review_response,
};

use crate::gateway::{Gateway, GenerateRequest};
use crate::ports::progress::{CouncilProgress, NoProgress};

/// Confidence reported when the chairman delivered the synthesis itself.
const CHAIRMAN_CONFIDENCE: f64 = 0.9;
/// Fallback confidence when peer reviews informed the selection.
const FALLBACK_CONFIDENCE_WITH_REVIEWS: f64 = 0.6;
/// Fallback confidence when no reviews were held.
const FALLBACK_CONFIDENCE_WITHOUT_REVIEWS: f64 = 0.5;

/// Input for one council run.
#[derive(Debug, Clone)]
pub struct CouncilRequest {
    pub query: Query,
    pub context: Option<String>,
    pub config: CouncilConfig,
}

impl CouncilRequest {
    pub fn new(query: Query, config: CouncilConfig) -> Self {
        Self {
            query,
            context: None,
            config,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Errors that abort a council run.
#[derive(Error, Debug)]
pub enum CouncilError {
    #[error(transparent)]
    InvalidConfig(#[from] DomainError),

    #[error("Chairman {0} has no registered responder")]
    UnresolvedChairman(String),

    #[error("Insufficient opinions: got {received}, need at least {required}")]
    InsufficientOpinions { received: usize, required: usize },

    #[error("Stage {stage} timed out after {timeout:?}")]
    StageTimeout { stage: Stage, timeout: Duration },
}

struct ReviewOutcome {
    reviews: Vec<ReviewResult>,
    tallies: Vec<RankTally>,
}

/// Runs the council protocol on top of the gateway.
///
/// All responder traffic goes through [`Gateway::call_responder`], so every
/// council call is guarded by the same breakers and timeouts as one-shot
/// requests, without sharing their cache or fallback chain.
pub struct CouncilOrchestrator {
    gateway: Arc<Gateway>,
}

impl CouncilOrchestrator {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn run(&self, request: CouncilRequest) -> Result<CouncilResponse, CouncilError> {
        self.run_with_progress(request, &NoProgress).await
    }

    pub async fn run_with_progress(
        &self,
        request: CouncilRequest,
        progress: &dyn CouncilProgress,
    ) -> Result<CouncilResponse, CouncilError> {
        request.config.validate()?;
        let chairman = request.config.chairman.clone();
        if !self.gateway.has_responder(&chairman) {
            return Err(CouncilError::UnresolvedChairman(chairman));
        }
        if !request.config.chairman_participates() {
            warn!(
                "chairman {} is not a council participant, proceeding anyway",
                chairman
            );
        }

        let started = Instant::now();
        info!(
            "council run: {} participants, chairman {}",
            request.config.participants.len(),
            chairman
        );

        let opinions = self.stage_opinions(&request, progress).await?;

        let (reviews, tallies) = if request.config.include_reviews {
            let outcome = self.stage_reviews(&request, &opinions, progress).await;
            (Some(outcome.reviews), outcome.tallies)
        } else {
            debug!("peer review disabled for this run");
            (None, Vec::new())
        };

        let review_slice: &[ReviewResult] = reviews.as_deref().unwrap_or(&[]);
        let synthesis = self
            .stage_synthesis(&request, &opinions, review_slice, &tallies, progress)
            .await;

        let metadata = CouncilMetadata {
            council_size: request.config.participants.len(),
            chairman,
            latency_ms: started.elapsed().as_millis() as u64,
            cost_multiplier: request.config.cost_multiplier(),
        };
        info!(
            "council finished in {}ms with confidence {:.2}",
            metadata.latency_ms, synthesis.confidence
        );

        Ok(CouncilResponse {
            answer: synthesis.text,
            opinions,
            reviews,
            rationale: synthesis.rationale,
            confidence: synthesis.confidence,
            metadata,
        })
    }

    /// Stage 1: every participant answers the query independently.
    ///
    /// Individual failures are dropped; the run only aborts when fewer than
    /// [`MIN_COUNCIL_SIZE`] opinions survive.
    async fn stage_opinions(
        &self,
        request: &CouncilRequest,
        progress: &dyn CouncilProgress,
    ) -> Result<Vec<Opinion>, CouncilError> {
        let participants = &request.config.participants;
        info!(
            "council stage 1: collecting {} first opinions",
            participants.len()
        );
        progress.on_stage_start(Stage::FirstOpinions, participants.len());

        let prompt = CouncilPrompts::opinion(&request.query, request.context.as_deref());
        let system = CouncilPrompts::opinion_system();
        let deadline = tokio::time::Instant::now() + request.config.stage_timeout;

        let mut join_set = JoinSet::new();
        for (index, name) in participants.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let name = name.clone();
            let generate = GenerateRequest::new(prompt.clone()).with_system_prompt(system);
            join_set.spawn(async move {
                let result = gateway.call_responder(&name, &generate).await;
                (index, name, result)
            });
        }

        let mut collected: Vec<(usize, Opinion)> = Vec::new();
        let mut deadline_hit = false;
        loop {
            match tokio::time::timeout_at(deadline, join_set.join_next()).await {
                Ok(Some(Ok((index, name, Ok(response))))) => {
                    debug!("opinion received from {}", name);
                    progress.on_task_complete(Stage::FirstOpinions, &name, true);
                    collected.push((index, Opinion::new(name, response.text)));
                }
                Ok(Some(Ok((_, name, Err(e))))) => {
                    warn!("participant {} failed: {}", name, e);
                    progress.on_task_complete(Stage::FirstOpinions, &name, false);
                }
                Ok(Some(Err(e))) => warn!("opinion task failed to join: {}", e),
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        "first opinions stage hit its {:?} deadline",
                        request.config.stage_timeout
                    );
                    join_set.abort_all();
                    deadline_hit = true;
                    break;
                }
            }
        }
        progress.on_stage_complete(Stage::FirstOpinions);

        // Keep participant order regardless of completion order
        collected.sort_by_key(|(index, _)| *index);
        let opinions: Vec<Opinion> = collected.into_iter().map(|(_, opinion)| opinion).collect();

        if opinions.len() < MIN_COUNCIL_SIZE {
            if deadline_hit {
                return Err(CouncilError::StageTimeout {
                    stage: Stage::FirstOpinions,
                    timeout: request.config.stage_timeout,
                });
            }
            return Err(CouncilError::InsufficientOpinions {
                received: opinions.len(),
                required: MIN_COUNCIL_SIZE,
            });
        }
        Ok(opinions)
    }

    /// Stage 2: each opinion's author ranks the other opinions.
    ///
    /// One label map is drawn per run, so every reviewer refers to the same
    /// opinion by the same letter. This stage never fails the run: missing
    /// or unparseable reviews degrade to the identity ranking with zero
    /// confidence.
    async fn stage_reviews(
        &self,
        request: &CouncilRequest,
        opinions: &[Opinion],
        progress: &dyn CouncilProgress,
    ) -> ReviewOutcome {
        let labels = LabelMap::shuffled(opinions.len());
        self.stage_reviews_with_labels(request, opinions, &labels, progress)
            .await
    }

    async fn stage_reviews_with_labels(
        &self,
        request: &CouncilRequest,
        opinions: &[Opinion],
        labels: &LabelMap,
        progress: &dyn CouncilProgress,
    ) -> ReviewOutcome {
        info!(
            "council stage 2: peer review across {} opinions",
            opinions.len()
        );
        progress.on_stage_start(Stage::PeerReview, opinions.len());
        let deadline = tokio::time::Instant::now() + request.config.stage_timeout;

        let mut join_set = JoinSet::new();
        for (reviewer_index, opinion) in opinions.iter().enumerate() {
            let shown = labels.shown_to(reviewer_index);
            let shown_texts: Vec<(String, &str)> = shown
                .iter()
                .map(|(label, original)| (label.clone(), opinions[*original].text.as_str()))
                .collect();
            let prompt = CouncilPrompts::review(&request.query, &shown_texts);
            let shown_originals: Vec<usize> =
                shown.into_iter().map(|(_, original)| original).collect();
            let reviewer = opinion.responder.clone();
            let gateway = Arc::clone(&self.gateway);
            let generate =
                GenerateRequest::new(prompt).with_system_prompt(CouncilPrompts::review_system());
            join_set.spawn(async move {
                let result = gateway.call_responder(&reviewer, &generate).await;
                (reviewer_index, reviewer, shown_originals, result)
            });
        }

        let mut slots: Vec<Option<(ReviewResult, RankTally)>> =
            (0..opinions.len()).map(|_| None).collect();
        loop {
            match tokio::time::timeout_at(deadline, join_set.join_next()).await {
                Ok(Some(Ok((index, reviewer, shown_originals, result)))) => {
                    let outcome = match result {
                        Ok(response) => {
                            match parse_review_response(&response.text, shown_originals.len()) {
                                RankingParse::Parsed {
                                    rankings,
                                    confidence,
                                    reasoning,
                                } => {
                                    debug!("review received from {}", reviewer);
                                    progress.on_task_complete(Stage::PeerReview, &reviewer, true);
                                    let ranks = shown_originals
                                        .iter()
                                        .copied()
                                        .zip(rankings.iter().copied())
                                        .collect();
                                    (
                                        ReviewResult::new(&reviewer, rankings, reasoning, confidence),
                                        RankTally { confidence, ranks },
                                    )
                                }
                                RankingParse::Failed { reason } => {
                                    warn!("review from {} not usable: {}", reviewer, reason);
                                    progress.on_task_complete(Stage::PeerReview, &reviewer, false);
                                    degraded_review(
                                        &reviewer,
                                        &shown_originals,
                                        format!("ranking not parsed: {reason}"),
                                    )
                                }
                            }
                        }
                        Err(e) => {
                            warn!("reviewer {} failed: {}", reviewer, e);
                            progress.on_task_complete(Stage::PeerReview, &reviewer, false);
                            degraded_review(
                                &reviewer,
                                &shown_originals,
                                format!("reviewer unavailable: {e}"),
                            )
                        }
                    };
                    slots[index] = Some(outcome);
                }
                Ok(Some(Err(e))) => warn!("review task failed to join: {}", e),
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        "peer review stage hit its {:?} deadline",
                        request.config.stage_timeout
                    );
                    join_set.abort_all();
                    break;
                }
            }
        }
        progress.on_stage_complete(Stage::PeerReview);

        // Reviewers that never reported before the deadline degrade too.
        let mut reviews = Vec::with_capacity(opinions.len());
        let mut tallies = Vec::with_capacity(opinions.len());
        for (index, slot) in slots.into_iter().enumerate() {
            let (review, tally) = match slot {
                Some(outcome) => outcome,
                None => {
                    let shown_originals: Vec<usize> = labels
                        .shown_to(index)
                        .into_iter()
                        .map(|(_, original)| original)
                        .collect();
                    degraded_review(
                        &opinions[index].responder,
                        &shown_originals,
                        "review missing before the stage deadline",
                    )
                }
            };
            reviews.push(review);
            tallies.push(tally);
        }
        ReviewOutcome { reviews, tallies }
    }

    /// Stage 3: the chairman synthesizes the final answer.
    ///
    /// Never fails: a chairman error or timeout falls back to the best
    /// peer-ranked opinion (or the first opinion when reviews are off).
    async fn stage_synthesis(
        &self,
        request: &CouncilRequest,
        opinions: &[Opinion],
        reviews: &[ReviewResult],
        tallies: &[RankTally],
        progress: &dyn CouncilProgress,
    ) -> SynthesisResult {
        let chairman = &request.config.chairman;
        info!("council stage 3: synthesis by chairman {}", chairman);
        progress.on_stage_start(Stage::Synthesis, 1);

        let prompt = CouncilPrompts::synthesis(&request.query, opinions, reviews);
        let generate =
            GenerateRequest::new(prompt).with_system_prompt(CouncilPrompts::synthesis_system());
        let result = tokio::time::timeout(
            request.config.stage_timeout,
            self.gateway.call_responder(chairman, &generate),
        )
        .await;

        let synthesis = match result {
            Ok(Ok(response)) => {
                progress.on_task_complete(Stage::Synthesis, chairman, true);
                let (answer, rationale) = split_rationale(&response.text);
                SynthesisResult::new(answer, rationale, CHAIRMAN_CONFIDENCE)
            }
            Ok(Err(e)) => {
                warn!("chairman {} failed: {}", chairman, e);
                progress.on_task_complete(Stage::Synthesis, chairman, false);
                fallback_synthesis(opinions, tallies, &format!("chairman failed ({e})"))
            }
            Err(_) => {
                warn!(
                    "synthesis stage hit its {:?} deadline",
                    request.config.stage_timeout
                );
                progress.on_task_complete(Stage::Synthesis, chairman, false);
                fallback_synthesis(opinions, tallies, "chairman timed out")
            }
        };
        progress.on_stage_complete(Stage::Synthesis);
        synthesis
    }
}

fn degraded_review(
    reviewer: &str,
    shown_originals: &[usize],
    reason: impl Into<String>,
) -> (ReviewResult, RankTally) {
    let shown_count = shown_originals.len();
    let review = ReviewResult::degraded(reviewer, shown_count, reason);
    let ranks = shown_originals.iter().copied().zip(1..=shown_count).collect();
    (
        review,
        RankTally {
            confidence: 0.0,
            ranks,
        },
    )
}

/// Deterministic stand-in when the chairman cannot deliver: the opinion with
/// the best confidence-weighted average rank wins; without reviews the first
/// opinion stands as written. Callers guarantee `opinions` is non-empty.
fn fallback_synthesis(opinions: &[Opinion], tallies: &[RankTally], reason: &str) -> SynthesisResult {
    if tallies.is_empty() {
        let first = &opinions[0];
        return SynthesisResult::new(
            first.text.clone(),
            format!("{reason}; no peer reviews were held, so {}'s opinion stands as written", first.responder),
            FALLBACK_CONFIDENCE_WITHOUT_REVIEWS,
        );
    }
    let scores = aggregate_rankings(tallies, opinions.len());
    let winner = best_opinion(&scores).unwrap_or(0);
    SynthesisResult::new(
        opinions[winner].text.clone(),
        format!(
            "{reason}; peers ranked {}'s opinion highest",
            opinions[winner].responder
        ),
        FALLBACK_CONFIDENCE_WITH_REVIEWS,
    )
}

/// Split a chairman reply into answer and rationale at the "Rationale:"
/// marker the synthesis prompt asks for. Best effort: replies without the
/// marker become the whole answer.
fn split_rationale(text: &str) -> (String, String) {
    if let Some(idx) = text.find("Rationale:") {
        let answer = text[..idx].trim();
        let rationale = text[idx + "Rationale:".len()..].trim();
        if !answer.is_empty() {
            return (answer.to_string(), rationale.to_string());
        }
    }
    (
        text.trim().to_string(),
        "Chairman synthesis of the council's opinions".to_string(),
    )
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::{GatewayBuilder, MockResponder};
    use conclave_domain::ResponderConfig;
    use std::sync::Mutex;

    fn config(name: &str) -> ResponderConfig {
        ResponderConfig::new(name, "mock-model", format!("http://{name}.test/v1"))
    }

    fn council_config(participants: &[&str], chairman: &str) -> CouncilConfig {
        CouncilConfig::new(
            participants.iter().map(|p| p.to_string()).collect(),
            chairman,
        )
    }

    fn request(participants: &[&str], chairman: &str) -> CouncilRequest {
        CouncilRequest::new(
            Query::new("What is the best way to version an API?"),
            council_config(participants, chairman),
        )
    }

    fn review_text(len: usize, confidence: f64) -> String {
        let rankings: Vec<String> = (1..=len).map(|r| r.to_string()).collect();
        format!(
            "{{\"rankings\": [{}], \"confidence\": {confidence}, \"reasoning\": \"ordered as shown\"}}",
            rankings.join(", ")
        )
    }

    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl RecordingProgress {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }

        fn stages_started(&self) -> Vec<String> {
            self.events
                .lock()
                .map(|events| {
                    events
                        .iter()
                        .filter_map(|e| e.strip_prefix("start:").map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        }
    }

    impl CouncilProgress for RecordingProgress {
        fn on_stage_start(&self, stage: Stage, _total_tasks: usize) {
            if let Ok(mut events) = self.events.lock() {
                events.push(format!("start:{stage}"));
            }
        }

        fn on_task_complete(&self, stage: Stage, responder: &str, success: bool) {
            if let Ok(mut events) = self.events.lock() {
                events.push(format!("task:{stage}:{responder}:{success}"));
            }
        }

        fn on_stage_complete(&self, stage: Stage) {
            if let Ok(mut events) = self.events.lock() {
                events.push(format!("end:{stage}"));
            }
        }
    }

    #[tokio::test]
    async fn test_council_size_bounds_are_enforced() {
        let (gateway, _health) = GatewayBuilder::new()
            .responder(config("a"), MockResponder::ok("a", "answer"))
            .build();
        let orchestrator = CouncilOrchestrator::new(gateway);

        let too_small = orchestrator.run(request(&["a"], "a")).await;
        assert!(matches!(
            too_small,
            Err(CouncilError::InvalidConfig(
                DomainError::InvalidCouncilSize { size: 1, .. }
            ))
        ));

        let names: Vec<&str> = vec!["a"; 8];
        let too_large = orchestrator.run(request(&names, "a")).await;
        assert!(matches!(
            too_large,
            Err(CouncilError::InvalidConfig(
                DomainError::InvalidCouncilSize { size: 8, .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_unknown_chairman_is_rejected() {
        let (gateway, _health) = GatewayBuilder::new()
            .responder(config("a"), MockResponder::ok("a", "answer"))
            .responder(config("b"), MockResponder::ok("b", "answer"))
            .build();
        let orchestrator = CouncilOrchestrator::new(gateway);

        let result = orchestrator.run(request(&["a", "b"], "ghost")).await;
        assert!(matches!(result, Err(CouncilError::UnresolvedChairman(name)) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_full_run_uses_chairman_synthesis() {
        let a = MockResponder::scripted(
            "a",
            vec![
                Some("Use URL versioning.".to_string()),
                Some(review_text(2, 0.9)),
                Some("Version in the URL path.\nRationale: two of three experts preferred it.".to_string()),
            ],
        );
        let b = MockResponder::scripted(
            "b",
            vec![
                Some("Use header versioning.".to_string()),
                Some(review_text(2, 0.8)),
            ],
        );
        let c = MockResponder::scripted(
            "c",
            vec![
                Some("Avoid breaking changes entirely.".to_string()),
                Some(review_text(2, 0.7)),
            ],
        );
        let (gateway, _health) = GatewayBuilder::new()
            .responder(config("a"), a.clone())
            .responder(config("b"), b.clone())
            .responder(config("c"), c.clone())
            .build();
        let orchestrator = CouncilOrchestrator::new(gateway);
        let progress = RecordingProgress::new();

        let response = orchestrator
            .run_with_progress(request(&["a", "b", "c"], "a"), &progress)
            .await
            .unwrap();

        assert_eq!(response.answer, "Version in the URL path.");
        assert!(response.rationale.contains("two of three experts"));
        assert_eq!(response.confidence, CHAIRMAN_CONFIDENCE);
        assert_eq!(response.opinions.len(), 3);
        assert_eq!(response.opinions[0].responder, "a");
        let reviews = response.reviews.as_ref().unwrap();
        assert_eq!(reviews.len(), 3);
        assert!(reviews.iter().all(|r| r.confidence > 0.0));
        assert_eq!(response.metadata.council_size, 3);
        assert_eq!(response.metadata.cost_multiplier, 4);
        assert_eq!(response.metadata.chairman, "a");
        // Chairman participated: opinion + review + synthesis.
        assert_eq!(a.call_count(), 3);
        assert_eq!(b.call_count(), 2);

        assert_eq!(
            progress.stages_started(),
            vec!["first-opinions", "peer-review", "synthesis"]
        );
    }

    #[tokio::test]
    async fn test_opinion_failures_are_isolated() {
        let a = MockResponder::scripted(
            "a",
            vec![
                Some("Opinion from a.".to_string()),
                Some("Rankings: [1]\nConfidence: 0.8\nThe other answer is solid.".to_string()),
            ],
        );
        let b = MockResponder::scripted(
            "b",
            vec![
                Some("Opinion from b.".to_string()),
                Some("Rankings: [1]\nConfidence: 0.6\nReasonable.".to_string()),
            ],
        );
        let broken = MockResponder::failing("broken");
        let chair = MockResponder::ok("chair", "Synthesis.\nRationale: merged.");
        let (gateway, _health) = GatewayBuilder::new()
            .responder(config("a"), a.clone())
            .responder(config("b"), b.clone())
            .responder(config("broken"), broken.clone())
            .responder(config("chair"), chair.clone())
            .build();
        let orchestrator = CouncilOrchestrator::new(gateway);

        // The chairman is not a participant: warned about, but allowed.
        let response = orchestrator
            .run(request(&["a", "b", "broken"], "chair"))
            .await
            .unwrap();

        assert_eq!(response.opinions.len(), 2);
        assert_eq!(response.answer, "Synthesis.");
        assert_eq!(response.reviews.as_ref().map(|r| r.len()), Some(2));
        assert_eq!(broken.call_count(), 1);
        // Council size reports the configured participants, not survivors.
        assert_eq!(response.metadata.council_size, 3);
    }

    #[tokio::test]
    async fn test_insufficient_opinions_aborts_the_run() {
        let a = MockResponder::failing("a");
        let b = MockResponder::failing("b");
        let c = MockResponder::scripted("c", vec![Some("Only opinion.".to_string())]);
        let (gateway, _health) = GatewayBuilder::new()
            .responder(config("a"), a.clone())
            .responder(config("b"), b.clone())
            .responder(config("c"), c.clone())
            .build();
        let orchestrator = CouncilOrchestrator::new(gateway);

        let result = orchestrator.run(request(&["a", "b", "c"], "c")).await;
        assert!(matches!(
            result,
            Err(CouncilError::InsufficientOpinions {
                received: 1,
                required: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_stage_timeout_reported_when_nothing_arrives() {
        let a = MockResponder::slow("a", Duration::from_millis(500), "late");
        let b = MockResponder::slow("b", Duration::from_millis(500), "late");
        let (gateway, _health) = GatewayBuilder::new()
            .responder(config("a"), a.clone())
            .responder(config("b"), b.clone())
            .build();
        let orchestrator = CouncilOrchestrator::new(gateway);

        let mut request = request(&["a", "b"], "a");
        request.config.stage_timeout = Duration::from_millis(30);

        let result = orchestrator.run(request).await;
        assert!(matches!(
            result,
            Err(CouncilError::StageTimeout {
                stage: Stage::FirstOpinions,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_reviews_disabled_skips_stage_two() {
        let a = MockResponder::scripted("a", vec![Some("First.".to_string())]);
        let b = MockResponder::scripted("b", vec![Some("Second.".to_string())]);
        let chair = MockResponder::failing("chair");
        let (gateway, _health) = GatewayBuilder::new()
            .responder(config("a"), a.clone())
            .responder(config("b"), b.clone())
            .responder(config("chair"), chair.clone())
            .build();
        let orchestrator = CouncilOrchestrator::new(gateway);

        let mut request = request(&["a", "b"], "chair");
        request.config.include_reviews = false;

        let response = orchestrator.run(request).await.unwrap();

        assert!(response.reviews.is_none());
        // Chairman failed with no reviews held: first opinion, low confidence.
        assert_eq!(response.answer, "First.");
        assert_eq!(response.confidence, FALLBACK_CONFIDENCE_WITHOUT_REVIEWS);
        // Each participant was only asked for an opinion.
        assert_eq!(a.call_count(), 1);
        assert_eq!(b.call_count(), 1);
    }

    #[tokio::test]
    async fn test_review_ranks_map_back_through_shuffled_labels() {
        let a = MockResponder::scripted("a", vec![Some(review_text(2, 0.8))]);
        let b = MockResponder::scripted("b", vec![Some(review_text(2, 0.8))]);
        let c = MockResponder::scripted("c", vec![Some(review_text(2, 0.8))]);
        let (gateway, _health) = GatewayBuilder::new()
            .responder(config("a"), a.clone())
            .responder(config("b"), b.clone())
            .responder(config("c"), c.clone())
            .build();
        let orchestrator = CouncilOrchestrator::new(gateway);

        let opinions = vec![
            Opinion::new("a", "Opinion a."),
            Opinion::new("b", "Opinion b."),
            Opinion::new("c", "Opinion c."),
        ];
        // Label A shows opinion 2, B shows opinion 0, C shows opinion 1.
        let labels = LabelMap::with_order(vec![2, 0, 1]);
        let request = request(&["a", "b", "c"], "a");

        let outcome = orchestrator
            .stage_reviews_with_labels(&request, &opinions, &labels, &NoProgress)
            .await;

        // Every reviewer ranked their first shown opinion 1 and the second
        // 2; the tallies must carry those ranks on the original indices.
        assert_eq!(outcome.tallies[0].ranks, vec![(2, 1), (1, 2)]);
        assert_eq!(outcome.tallies[1].ranks, vec![(2, 1), (0, 2)]);
        assert_eq!(outcome.tallies[2].ranks, vec![(0, 1), (1, 2)]);

        let scores = aggregate_rankings(&outcome.tallies, opinions.len());
        assert_eq!(best_opinion(&scores), Some(2));
    }

    #[tokio::test]
    async fn test_chairman_failure_falls_back_to_ranked_opinion() {
        let a = MockResponder::scripted(
            "a",
            vec![
                Some("Opinion a.".to_string()),
                Some(review_text(2, 0.9)),
            ],
        );
        let b = MockResponder::scripted(
            "b",
            vec![
                Some("Opinion b.".to_string()),
                Some(review_text(2, 0.5)),
            ],
        );
        let c = MockResponder::scripted(
            "c",
            vec![
                Some("Opinion c.".to_string()),
                Some("no ranking here, sorry".to_string()),
            ],
        );
        let chair = MockResponder::failing("chair");
        let (gateway, _health) = GatewayBuilder::new()
            .responder(config("a"), a.clone())
            .responder(config("b"), b.clone())
            .responder(config("c"), c.clone())
            .responder(config("chair"), chair.clone())
            .build();
        let orchestrator = CouncilOrchestrator::new(gateway);

        let response = orchestrator.run(request(&["a", "b", "c"], "chair")).await.unwrap();

        // Which opinion wins depends on the label shuffle; the fallback
        // contract is what must hold.
        assert_eq!(response.confidence, FALLBACK_CONFIDENCE_WITH_REVIEWS);
        assert!(response.rationale.contains("ranked"));
        assert!(
            response
                .opinions
                .iter()
                .any(|opinion| opinion.text == response.answer)
        );
        // The unparseable review degraded instead of vanishing.
        let reviews = response.reviews.as_ref().unwrap();
        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[2].confidence, 0.0);
    }

    #[tokio::test]
    async fn test_fallback_synthesis_selects_weighted_winner() {
        let opinions = vec![
            Opinion::new("a", "Opinion a."),
            Opinion::new("b", "Opinion b."),
            Opinion::new("c", "Opinion c."),
        ];
        // The confident reviewers split between opinions 1 and 2; opinion 1
        // carries the best confidence-weighted average rank.
        let tallies = vec![
            RankTally {
                confidence: 1.0,
                ranks: vec![(1, 1), (2, 2)],
            },
            RankTally {
                confidence: 1.0,
                ranks: vec![(0, 2), (2, 1)],
            },
            RankTally {
                confidence: 0.5,
                ranks: vec![(0, 1), (1, 2)],
            },
        ];
        let synthesis = fallback_synthesis(&opinions, &tallies, "chairman failed");
        assert_eq!(synthesis.text, "Opinion b.");
        assert_eq!(synthesis.confidence, FALLBACK_CONFIDENCE_WITH_REVIEWS);
        assert!(synthesis.rationale.contains("b"));

        let without_reviews = fallback_synthesis(&opinions, &[], "chairman timed out");
        assert_eq!(without_reviews.text, "Opinion a.");
        assert_eq!(
            without_reviews.confidence,
            FALLBACK_CONFIDENCE_WITHOUT_REVIEWS
        );
    }

    #[test]
    fn test_split_rationale() {
        let (answer, rationale) = split_rationale("The answer.\nRationale: because.");
        assert_eq!(answer, "The answer.");
        assert_eq!(rationale, "because.");

        let (answer, rationale) = split_rationale("Just an answer.");
        assert_eq!(answer, "Just an answer.");
        assert!(rationale.contains("synthesis"));

        // A reply that is nothing but a rationale keeps its text as answer.
        let (answer, _) = split_rationale("Rationale: only this.");
        assert_eq!(answer, "Rationale: only this.");
    }
}
