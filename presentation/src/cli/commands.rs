//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for routed and council responses
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Full formatted output with stages and metadata
    Full,
    /// Only the final answer
    Answer,
    /// JSON output
    Json,
}

/// CLI arguments for llm-conclave
#[derive(Parser, Debug)]
#[command(name = "llm-conclave")]
#[command(author, version, about = "Resilient LLM router with multi-model councils")]
#[command(long_about = r#"
llm-conclave routes a prompt to the best available LLM provider and falls
back automatically when one misbehaves. Every request walks the same
pipeline: response cache, role fallback chain, circuit breakers, offline
responder.

Council mode convenes several models on one question in three stages:
1. First Opinions: all participants answer in parallel
2. Peer Review: each participant ranks the anonymized answers of the others
3. Synthesis: a chairman model merges everything into a final answer

Configuration files are loaded from (in priority order):
1. CONCLAVE_* environment variables (CONCLAVE_GATEWAY__CALL_TIMEOUT_SECS=10)
2. --config <path>     Explicit config file
3. ./conclave.toml     Project-level config (or .conclave.toml)
4. ~/.config/conclave/config.toml   Global config

Example:
  llm-conclave "What's the best way to handle errors in Rust?"
  llm-conclave --role code "Rewrite this loop with iterators"
  llm-conclave --council -p gigachat -p yandex-gpt "Compare async runtimes"
  llm-conclave --check-health
"#)]
pub struct Cli {
    /// The prompt to send (not required with --check-health or --show-config)
    pub question: Option<String>,

    /// Convene a council instead of routing to a single responder
    #[arg(long)]
    pub council: bool,

    /// Role whose fallback chain routes the request
    #[arg(short, long, value_name = "ROLE")]
    pub role: Option<String>,

    /// System prompt sent ahead of the question
    #[arg(long, value_name = "TEXT")]
    pub system: Option<String>,

    /// Sampling temperature
    #[arg(long, value_name = "FLOAT")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Per-call timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Council participants (can be specified multiple times)
    #[arg(short, long, value_name = "RESPONDER")]
    pub participant: Vec<String>,

    /// Responder that chairs the council synthesis
    #[arg(long, value_name = "RESPONDER")]
    pub chairman: Option<String>,

    /// Skip the peer review stage
    #[arg(long)]
    pub no_reviews: bool,

    /// Extra context shown to every council participant
    #[arg(long, value_name = "TEXT")]
    pub context: Option<String>,

    /// Probe all responders once and print the health table
    #[arg(long)]
    pub check_health: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "answer")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the effective config, then exit
    #[arg(long)]
    pub show_config: bool,
}
