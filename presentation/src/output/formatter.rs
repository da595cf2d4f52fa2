//! Output formatter trait

use conclave_application::FallbackEvent;
use conclave_domain::{CouncilResponse, GatewayResponse};

/// Trait for formatting routed and council results
pub trait OutputFormatter {
    /// Format the complete routed response with metadata and fallbacks
    fn format_response(&self, response: &GatewayResponse, fallbacks: &[FallbackEvent]) -> String;

    /// Format a routed response as JSON
    fn format_response_json(
        &self,
        response: &GatewayResponse,
        fallbacks: &[FallbackEvent],
    ) -> String;

    /// Format only the answer text of a routed response
    fn format_answer(&self, response: &GatewayResponse) -> String;

    /// Format the complete council result with all stages
    fn format_council(&self, response: &CouncilResponse) -> String;

    /// Format a council result as JSON
    fn format_council_json(&self, response: &CouncilResponse) -> String;

    /// Format only the synthesized answer of a council result
    fn format_council_answer(&self, response: &CouncilResponse) -> String;
}
