//! Council domain: configuration, stage artifacts, anonymization labels and
//! ranking math for the three-stage consensus protocol.

pub mod config;
pub mod label;
pub mod opinion;
pub mod ranking;

pub use config::{CouncilConfig, MAX_COUNCIL_SIZE, MIN_COUNCIL_SIZE};
pub use label::LabelMap;
pub use opinion::{CouncilMetadata, CouncilResponse, Opinion, ReviewResult, Stage, SynthesisResult};
pub use ranking::{RankTally, RankingParse, aggregate_rankings, best_opinion, parse_review_response};
