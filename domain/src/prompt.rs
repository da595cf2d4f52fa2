//! Prompt templates for the council protocol

use crate::core::query::Query;
use crate::council::opinion::{Opinion, ReviewResult};

/// Templates for the prompts issued at each council stage
pub struct CouncilPrompts;

impl CouncilPrompts {
    /// System prompt for stage 1 (first opinions)
    pub fn opinion_system() -> &'static str {
        r#"You are one of several independent experts answering the same question.
Give your own best answer. Be concise but complete, and support your points
with reasoning. Do not speculate about what other experts might say."#
    }

    /// User prompt for stage 1
    pub fn opinion(query: &Query, context: Option<&str>) -> String {
        match context {
            Some(context) => format!(
                r#"Context:
{}

Please answer the following question:

{}"#,
                context, query
            ),
            None => format!(
                r#"Please answer the following question:

{}"#,
                query
            ),
        }
    }

    /// System prompt for stage 2 (peer review)
    pub fn review_system() -> &'static str {
        r#"You are a critical reviewer ranking anonymous answers to a question.
Judge only the text in front of you: accuracy, completeness, clarity and
practical usefulness. Do not try to guess who wrote which answer."#
    }

    /// User prompt for stage 2. `shown` pairs each anonymized label with the
    /// opinion text, in the order the reviewer sees them.
    pub fn review(query: &Query, shown: &[(String, &str)]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Rank the following {} responses from best (1) to worst ({}).

"#,
            query,
            shown.len(),
            shown.len()
        );

        for (label, text) in shown {
            prompt.push_str(&format!("--- {} ---\n{}\n\n", label, text));
        }

        prompt.push_str(
            r#"Answer in exactly this format:

Rankings: [ranks in the order the responses appear above, 1 = best]
Confidence: [0.0-1.0]
Reasoning: [2-3 sentences]

Example for three responses where the second shown is best:
Rankings: [2, 1, 3]
Confidence: 0.8
Reasoning: ..."#,
        );

        prompt
    }

    /// System prompt for stage 3 (chairman synthesis)
    pub fn synthesis_system() -> &'static str {
        r#"You are the chairman of an expert council. Several experts answered the
same question and then ranked each other's answers. Synthesize one final
answer: keep the strongest elements, resolve disagreements explicitly, and
do not introduce claims no expert made."#
    }

    /// User prompt for stage 3
    pub fn synthesis(query: &Query, opinions: &[Opinion], reviews: &[ReviewResult]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Expert answers:
"#,
            query
        );

        for opinion in opinions {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", opinion.responder, opinion.text));
        }

        if !reviews.is_empty() {
            prompt.push_str("\nPeer rankings (1 = best, over the answers each reviewer saw):\n");
            for review in reviews {
                prompt.push_str(&format!(
                    "- {} ranked {:?} (confidence {:.2})\n",
                    review.reviewer, review.rankings, review.confidence
                ));
            }
        }

        prompt.push_str(
            r#"
Produce the council's final answer. Start directly with the answer itself;
after it, add a short "Rationale:" section explaining how the expert
answers and rankings informed it."#,
        );

        prompt
    }
}
