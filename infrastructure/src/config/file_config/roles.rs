//! Role chain definitions from TOML (`[roles.<role>]` tables)

use conclave_domain::{FallbackChain, Role};
use serde::{Deserialize, Serialize};

/// Fallback chain for one role.
///
/// The table key becomes the role name (matched case-insensitively against
/// request roles).
///
/// # Example
///
/// ```toml
/// [roles.code]
/// primary = "gigachat"
/// fallbacks = ["yandex-gpt", "local"]
///
/// [roles.chat]
/// primary = "yandex-gpt"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileRoleConfig {
    /// First responder tried for this role
    pub primary: String,
    /// Tried in order after the primary fails
    pub fallbacks: Vec<String>,
}

impl FileRoleConfig {
    /// Convert into a registry chain under the given table key.
    pub fn to_chain(&self, role: &str) -> FallbackChain {
        FallbackChain::new(Role::new(role), self.primary.as_str())
            .with_fallbacks(self.fallbacks.clone())
    }

    /// Every responder name this chain references, primary first.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_chain_deserialize() {
        let toml_str = r#"
[roles.code]
primary = "gigachat"
fallbacks = ["yandex-gpt", "local"]
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let chain = config.roles["code"].to_chain("code");
        assert_eq!(chain.role, Role::new("code"));
        let ordered: Vec<&str> = chain.ordered().collect();
        assert_eq!(ordered, vec!["gigachat", "yandex-gpt", "local"]);
    }

    #[test]
    fn test_members_lists_primary_then_fallbacks() {
        let role = FileRoleConfig {
            primary: "a".to_string(),
            fallbacks: vec!["b".to_string()],
        };
        let members: Vec<&str> = role.members().collect();
        assert_eq!(members, vec!["a", "b"]);
    }
}
