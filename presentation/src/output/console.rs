//! Console output formatter for routed and council results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use conclave_application::FallbackEvent;
use conclave_domain::{CouncilResponse, GatewayResponse, HealthStatus, ResponderHealth};
use serde_json::json;

/// Formats gateway and council results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete routed response
    pub fn format_response(response: &GatewayResponse, fallbacks: &[FallbackEvent]) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Routed Response"));
        output.push('\n');

        output.push_str(&format!(
            "{} {} ({})\n",
            "Responder:".cyan().bold(),
            response.responder,
            response.model
        ));
        if let Some(role) = &response.metadata.role {
            output.push_str(&format!("{} {}\n", "Role:".cyan().bold(), role));
        }

        output.push_str(&Self::section_header("Answer"));
        output.push_str(&format!("\n{}\n", response.text));

        output.push_str(&Self::section_header("Details"));
        if let Some(latency) = response.metadata.latency_ms {
            output.push_str(&format!("  latency: {}ms\n", latency));
        }
        if let Some(usage) = &response.metadata.usage {
            output.push_str(&format!(
                "  tokens: {} prompt + {} completion = {}\n",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            ));
        }
        for flag in Self::degradation_flags(response) {
            output.push_str(&format!("  {}\n", flag.yellow()));
        }

        if !fallbacks.is_empty() {
            output.push_str(&Self::section_header("Fallbacks"));
            for event in fallbacks {
                output.push_str(&format!(
                    "  {} {} -> {}: {}\n",
                    event.at.format("%H:%M:%S"),
                    event.from.bold(),
                    event.to.bold(),
                    event.reason
                ));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format a routed response as JSON
    pub fn format_response_json(response: &GatewayResponse, fallbacks: &[FallbackEvent]) -> String {
        let value = json!({
            "response": response,
            "fallbacks": fallbacks,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format only the answer text of a routed response
    pub fn format_answer(response: &GatewayResponse) -> String {
        response.text.clone()
    }

    /// Format the complete council result
    pub fn format_council(response: &CouncilResponse) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Council Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {} participants, chaired by {}\n",
            "Council:".cyan().bold(),
            response.metadata.council_size,
            response.metadata.chairman
        ));

        output.push_str(&Self::section_header("Stage 1: First Opinions"));
        for opinion in &response.opinions {
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("── {} ──", opinion.responder).yellow().bold(),
                opinion.text
            ));
        }

        if let Some(reviews) = &response.reviews {
            output.push_str(&Self::section_header("Stage 2: Peer Review"));
            for review in reviews {
                output.push_str(&format!(
                    "\n{}\n",
                    format!("── {} ──", review.reviewer).yellow().bold()
                ));
                output.push_str(&format!(
                    "  ranks: {}   confidence: {:.2}\n",
                    Self::format_ranking(&review.rankings),
                    review.confidence
                ));
                if !review.reasoning.is_empty() {
                    output.push_str(&format!("{}\n", Self::indent(&review.reasoning, "  ")));
                }
            }
        }

        output.push_str(&Self::section_header("Stage 3: Synthesis"));
        output.push_str(&format!(
            "\n{}\n\n{}\n",
            format!("Chairman: {}", response.metadata.chairman)
                .yellow()
                .bold(),
            response.answer
        ));

        if !response.rationale.is_empty() {
            output.push_str(&format!(
                "\n{}\n{}\n",
                "Rationale:".cyan().bold(),
                response.rationale
            ));
        }

        output.push_str(&format!(
            "\n{} {:.2}    {} {}ms    {} x{}\n",
            "Confidence:".cyan().bold(),
            response.confidence,
            "Latency:".cyan().bold(),
            response.metadata.latency_ms,
            "Cost:".cyan().bold(),
            response.metadata.cost_multiplier
        ));

        output.push_str(&Self::footer());

        output
    }

    /// Format a council result as JSON
    pub fn format_council_json(response: &CouncilResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format only the synthesized answer of a council result
    pub fn format_council_answer(response: &CouncilResponse) -> String {
        response.answer.clone()
    }

    /// Render the health table as aligned rows
    pub fn format_health(records: &[(String, ResponderHealth)]) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Responder Health"));
        output.push('\n');

        output.push_str(&format!(
            "{}\n",
            format!(
                "{:<18} {:<11} {:>9}   {}",
                "Responder", "Status", "Latency", "Last error"
            )
            .bold()
        ));
        for (name, health) in records {
            let status = Self::colorize_status(health.status);
            let latency = match health.latency_ms {
                Some(ms) => format!("{}ms", ms),
                None => "-".to_string(),
            };
            output.push_str(&format!(
                "{:<18} {} {:>9}   {}\n",
                name,
                status,
                latency,
                health.last_error.as_deref().unwrap_or("-")
            ));
        }

        output.push_str(&Self::footer());

        output
    }

    fn colorize_status(status: HealthStatus) -> String {
        // Pad before coloring so ANSI codes do not skew the columns
        let cell = format!("{:<11}", status.as_str());
        match status {
            HealthStatus::Healthy => cell.green(),
            HealthStatus::Degraded => cell.yellow(),
            HealthStatus::Unhealthy => cell.red(),
            HealthStatus::Unknown => cell.dimmed(),
        }
        .to_string()
    }

    fn degradation_flags(response: &GatewayResponse) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if response.metadata.cached {
            flags.push("served from cache");
        }
        if response.metadata.offline {
            flags.push("answered by the offline responder");
        }
        if response.metadata.placeholder {
            flags.push("placeholder: no responder could answer");
        }
        flags
    }

    // rankings[j] is the rank the reviewer gave the j-th opinion shown to them
    fn format_ranking(rankings: &[usize]) -> String {
        let ranks: Vec<String> = rankings.iter().map(|rank| rank.to_string()).collect();
        format!("[{}]", ranks.join(", "))
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_response(&self, response: &GatewayResponse, fallbacks: &[FallbackEvent]) -> String {
        Self::format_response(response, fallbacks)
    }

    fn format_response_json(
        &self,
        response: &GatewayResponse,
        fallbacks: &[FallbackEvent],
    ) -> String {
        Self::format_response_json(response, fallbacks)
    }

    fn format_answer(&self, response: &GatewayResponse) -> String {
        Self::format_answer(response)
    }

    fn format_council(&self, response: &CouncilResponse) -> String {
        Self::format_council(response)
    }

    fn format_council_json(&self, response: &CouncilResponse) -> String {
        Self::format_council_json(response)
    }

    fn format_council_answer(&self, response: &CouncilResponse) -> String {
        Self::format_council_answer(response)
    }
}

// ==================== Tests ====================
