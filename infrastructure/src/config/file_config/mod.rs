//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types by the section helpers.

mod cache;
mod council;
mod gateway;
mod health;
mod resilience;
mod responders;
mod roles;

pub use cache::FileCacheConfig;
pub use council::FileCouncilConfig;
pub use gateway::FileGatewayConfig;
pub use health::FileHealthConfig;
pub use resilience::{FileBreakerConfig, FileRetryConfig};
pub use responders::FileResponderConfig;
pub use roles::FileRoleConfig;

use std::collections::BTreeMap;
use std::time::Duration;

use conclave_domain::{
    ConfigIssue, CouncilConfig, MAX_COUNCIL_SIZE, MIN_COUNCIL_SIZE, ResponderRegistry,
};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Gateway routing settings
    pub gateway: FileGatewayConfig,
    /// Response cache settings
    pub cache: FileCacheConfig,
    /// Circuit breaker settings
    pub breaker: FileBreakerConfig,
    /// Adapter transport retry settings
    pub retry: FileRetryConfig,
    /// Health monitor settings
    pub health: FileHealthConfig,
    /// Council defaults
    pub council: FileCouncilConfig,
    /// Responder definitions, keyed by name
    pub responders: BTreeMap<String, FileResponderConfig>,
    /// Role fallback chains, keyed by role name
    pub roles: BTreeMap<String, FileRoleConfig>,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks cross-references between sections: chain members, council
    /// participants and gateway defaults must name defined responders, and
    /// enabled responders need the fields the adapters rely on. Nothing
    /// here aborts loading; the caller decides what to do with the issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Responder entries must be usable by the adapters
        for (name, entry) in &self.responders {
            if !entry.enabled {
                continue;
            }
            if entry.model.is_empty() {
                issues.push(ConfigIssue::error(
                    format!("responders.{name}.model"),
                    "must not be empty",
                ));
            }
            if entry.base_url.is_empty() && !entry.self_hosted {
                issues.push(ConfigIssue::error(
                    format!("responders.{name}.base_url"),
                    "must not be empty",
                ));
            }
        }
        if !self.responders.values().any(|entry| entry.enabled) {
            issues.push(ConfigIssue::warning(
                "responders",
                "no responders are enabled; every request will resolve to a placeholder",
            ));
        }

        // 2. Gateway defaults must reference defined responders
        if let Some(name) = &self.gateway.default_responder
            && !self.responders.contains_key(name)
        {
            issues.push(ConfigIssue::warning(
                "gateway.default_responder",
                format!("unknown responder '{name}', ignoring"),
            ));
        }
        if let Some(name) = &self.gateway.offline_responder
            && !self.responders.contains_key(name)
        {
            issues.push(ConfigIssue::warning(
                "gateway.offline_responder",
                format!("unknown responder '{name}', ignoring"),
            ));
        }

        // 3. Role chains must reference defined responders
        for (role, chain) in &self.roles {
            if role.trim().is_empty() {
                issues.push(ConfigIssue::error("roles", "role names must not be blank"));
                continue;
            }
            if chain.primary.is_empty() {
                issues.push(ConfigIssue::error(
                    format!("roles.{role}.primary"),
                    "must not be empty",
                ));
            }
            for member in chain.members() {
                if !member.is_empty() && !self.responders.contains_key(member) {
                    issues.push(ConfigIssue::warning(
                        format!("roles.{role}"),
                        format!("unknown responder '{member}' in chain"),
                    ));
                }
            }
        }

        // 4. Council references and size
        for name in &self.council.participants {
            if !self.responders.contains_key(name) {
                issues.push(ConfigIssue::warning(
                    "council.participants",
                    format!("unknown responder '{name}'"),
                ));
            }
        }
        let council_size = self.council.participants.len();
        if council_size > 0 && !(MIN_COUNCIL_SIZE..=MAX_COUNCIL_SIZE).contains(&council_size) {
            issues.push(ConfigIssue::warning(
                "council.participants",
                format!(
                    "{council_size} participants configured; councils need between \
                     {MIN_COUNCIL_SIZE} and {MAX_COUNCIL_SIZE}, runs will fail"
                ),
            ));
        }
        if let Some(name) = &self.council.chairman
            && !self.responders.contains_key(name)
        {
            issues.push(ConfigIssue::warning(
                "council.chairman",
                format!("unknown responder '{name}'"),
            ));
        }

        issues.extend(self.retry.parse_strategy().1);

        issues
    }

    /// Build the immutable responder registry: entries, chains and the
    /// gateway defaults, with defaulting applied.
    ///
    /// An omitted or unknown default responder falls back to the
    /// highest-priority enabled entry; the offline responder stays unset
    /// unless the configured name is defined (the registry then falls back
    /// to the first enabled self-hosted entry on its own).
    pub fn registry(&self) -> ResponderRegistry {
        let configs = self
            .responders
            .iter()
            .map(|(name, entry)| entry.to_config(name))
            .collect();
        // Blank role keys fail validation and never become chains
        let chains = self
            .roles
            .iter()
            .filter(|(role, _)| !role.trim().is_empty())
            .map(|(role, chain)| chain.to_chain(role))
            .collect();

        let mut registry = ResponderRegistry::new(configs).with_chains(chains);

        let default = self
            .gateway
            .default_responder
            .as_deref()
            .filter(|name| registry.contains(name))
            .map(str::to_string)
            .or_else(|| registry.enabled().next().map(|c| c.name.clone()));
        if let Some(name) = default {
            registry = registry.with_default_responder(name);
        }

        if let Some(name) = self
            .gateway
            .offline_responder
            .as_deref()
            .filter(|name| registry.contains(name))
        {
            registry = registry.with_offline_responder(name.to_string());
        }

        registry
    }

    /// Council configuration with defaulting applied: empty participants
    /// become every enabled responder in priority order (capped at the
    /// council maximum), an empty chairman becomes the first participant.
    pub fn council_config(&self, registry: &ResponderRegistry) -> CouncilConfig {
        let participants: Vec<String> = if self.council.participants.is_empty() {
            registry
                .enabled()
                .take(MAX_COUNCIL_SIZE)
                .map(|c| c.name.clone())
                .collect()
        } else {
            self.council.participants.clone()
        };

        let chairman = self
            .council
            .chairman
            .clone()
            .or_else(|| participants.first().cloned())
            .unwrap_or_default();

        let mut config = CouncilConfig::new(participants, chairman)
            .with_stage_timeout(Duration::from_secs(self.council.stage_timeout_secs));
        if !self.council.include_reviews {
            config = config.without_reviews();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::{Role, Severity};

    fn full_config() -> FileConfig {
        let toml_str = r#"
[gateway]
default_responder = "gigachat"
offline_responder = "local"
call_timeout_secs = 20

[responders.gigachat]
model = "GigaChat-Pro"
base_url = "https://gigachat.example/api/v1"
api_key_env = "GIGACHAT_API_KEY"
priority = 10

[responders.yandex-gpt]
model = "yandexgpt"
base_url = "https://llm.yandex.example/v1"
priority = 5

[responders.local]
model = "llama3"
self_hosted = true
priority = 1

[roles.code]
primary = "gigachat"
fallbacks = ["yandex-gpt", "local"]

[council]
participants = ["gigachat", "yandex-gpt"]
chairman = "gigachat"
"#;
        toml::from_str(toml_str).unwrap()
    }

    // ==================== Deserialization Tests ====================

    #[test]
    fn test_deserialize_full_config() {
        let config = full_config();
        assert_eq!(config.responders.len(), 3);
        assert_eq!(config.roles.len(), 1);
        assert_eq!(config.gateway.call_timeout_secs, 20);
        assert_eq!(config.council.participants.len(), 2);
    }

    #[test]
    fn test_default_config_is_empty() {
        let config = FileConfig::default();
        assert!(config.responders.is_empty());
        assert!(config.roles.is_empty());
        assert!(config.gateway.default_responder.is_none());
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_validate_full_config_is_clean() {
        assert!(full_config().validate().is_empty());
    }

    #[test]
    fn test_validate_empty_config_warns_about_responders() {
        let issues = FileConfig::default().validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "responders");
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_validate_unknown_chain_member() {
        let mut config = full_config();
        config
            .roles
            .get_mut("code")
            .unwrap()
            .fallbacks
            .push("ghost".to_string());
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "roles.code");
        assert!(issues[0].message.contains("ghost"));
    }

    #[test]
    fn test_blank_role_key_is_fatal_and_skipped() {
        let mut config = full_config();
        config.roles.insert(
            "  ".to_string(),
            FileRoleConfig {
                primary: "gigachat".to_string(),
                fallbacks: Vec::new(),
            },
        );
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.field == "roles" && i.is_fatal()));
        // registry() stays usable even when validation was ignored
        let registry = config.registry();
        assert!(registry.chain_for(&Role::new("code")).is_some());
    }

    #[test]
    fn test_validate_unknown_gateway_default() {
        let mut config = full_config();
        config.gateway.default_responder = Some("ghost".to_string());
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.field == "gateway.default_responder"));
    }

    #[test]
    fn test_validate_missing_base_url_is_fatal() {
        let mut config = full_config();
        config.responders.get_mut("gigachat").unwrap().base_url = String::new();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.is_fatal()));
    }

    #[test]
    fn test_validate_self_hosted_may_omit_base_url() {
        let mut config = full_config();
        config.responders.get_mut("local").unwrap().base_url = String::new();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_oversized_council() {
        let mut config = full_config();
        config.council.participants =
            (0..8).map(|i| format!("r{i}")).collect();
        let issues = config.validate();
        // 8 unknown names plus the size warning
        assert_eq!(issues.len(), 9);
        assert!(issues.iter().any(|i| i.message.contains("between 2 and 7")));
    }

    // ==================== Registry Building Tests ====================

    #[test]
    fn test_registry_carries_entries_and_chains() {
        let registry = full_config().registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.default_responder(), Some("gigachat"));
        assert_eq!(registry.offline_responder(), Some("local"));
        let chain = registry.chain_for(&Role::new("code")).unwrap();
        let ordered: Vec<&str> = chain.ordered().collect();
        assert_eq!(ordered, vec!["gigachat", "yandex-gpt", "local"]);
    }

    #[test]
    fn test_registry_defaults_to_highest_priority() {
        let mut config = full_config();
        config.gateway.default_responder = None;
        let registry = config.registry();
        assert_eq!(registry.default_responder(), Some("gigachat"));

        config.gateway.default_responder = Some("ghost".to_string());
        let registry = config.registry();
        assert_eq!(registry.default_responder(), Some("gigachat"));
    }

    #[test]
    fn test_registry_unset_offline_falls_back_to_self_hosted() {
        let mut config = full_config();
        config.gateway.offline_responder = None;
        let registry = config.registry();
        assert_eq!(registry.offline_responder(), Some("local"));
    }

    // ==================== Council Defaulting Tests ====================

    #[test]
    fn test_council_config_explicit_values_pass_through() {
        let config = full_config();
        let registry = config.registry();
        let council = config.council_config(&registry);
        assert_eq!(council.participants, vec!["gigachat", "yandex-gpt"]);
        assert_eq!(council.chairman, "gigachat");
        assert_eq!(council.stage_timeout, Duration::from_secs(120));
        assert!(council.include_reviews);
    }

    #[test]
    fn test_council_config_defaults_to_enabled_responders() {
        let mut config = full_config();
        config.council.participants.clear();
        config.council.chairman = None;
        let registry = config.registry();
        let council = config.council_config(&registry);
        // Priority order: gigachat (10), yandex-gpt (5), local (1)
        assert_eq!(council.participants, vec!["gigachat", "yandex-gpt", "local"]);
        assert_eq!(council.chairman, "gigachat");
    }
}
