//! Health probing adapters.

mod http;

pub use http::HttpHealthProbe;

use conclave_application::ProbeTarget;
use conclave_domain::ResponderRegistry;

/// Probe targets for every enabled registry entry.
pub fn probe_targets(registry: &ResponderRegistry) -> Vec<ProbeTarget> {
    registry
        .enabled()
        .map(|config| ProbeTarget::new(config.name.as_str(), config.probe_url()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::ResponderConfig;

    #[test]
    fn test_targets_cover_enabled_entries_with_probe_urls() {
        let registry = ResponderRegistry::new(vec![
            ResponderConfig::new("a", "m", "http://a/v1")
                .with_priority(2)
                .with_health_url("http://a/health"),
            ResponderConfig::new("b", "m", "http://b/v1").with_priority(1),
            ResponderConfig::new("c", "m", "http://c/v1").disabled(),
        ]);
        let targets = probe_targets(&registry);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name, "a");
        assert_eq!(targets[0].url, "http://a/health");
        assert_eq!(targets[1].name, "b");
        assert_eq!(targets[1].url, "http://b/v1");
    }
}
