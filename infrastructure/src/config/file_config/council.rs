//! Council configuration from TOML (`[council]` section)

use serde::{Deserialize, Serialize};

/// Council defaults applied when the CLI flags leave them unset.
///
/// Participants left empty fall back to every enabled responder (capped at
/// the council maximum); an empty chairman falls back to the first
/// participant. That defaulting needs the registry and lives on
/// [`super::FileConfig::council_config`].
///
/// # Example
///
/// ```toml
/// [council]
/// participants = ["gigachat", "yandex-gpt", "local"]
/// chairman = "gigachat"
/// stage_timeout_secs = 120
/// include_reviews = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Responders taking part in stages 1 and 2
    pub participants: Vec<String>,
    /// Responder that produces the final synthesis
    pub chairman: Option<String>,
    /// Per-stage deadline in seconds
    pub stage_timeout_secs: u64,
    /// Whether the peer-review stage runs
    pub include_reviews: bool,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            participants: Vec::new(),
            chairman: None,
            stage_timeout_secs: 120,
            include_reviews: true,
        }
    }
}
