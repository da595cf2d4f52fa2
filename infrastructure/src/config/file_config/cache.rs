//! Response cache configuration from TOML (`[cache]` section)

use std::time::Duration;

use conclave_application::ResponseCache;
use serde::{Deserialize, Serialize};

/// Response cache settings
///
/// # Example
///
/// ```toml
/// [cache]
/// enabled = true
/// capacity = 128      # entries kept before LRU eviction
/// ttl_secs = 300      # entry lifetime
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub enabled: bool,
    /// Maximum number of cached responses
    pub capacity: usize,
    /// Entry lifetime in seconds
    pub ttl_secs: u64,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 128,
            ttl_secs: 300,
        }
    }
}

impl FileCacheConfig {
    /// Build the cache, or `None` when caching is disabled.
    pub fn to_cache(&self) -> Option<ResponseCache> {
        if !self.enabled {
            return None;
        }
        Some(ResponseCache::new(
            self.capacity,
            Duration::from_secs(self.ttl_secs),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = FileCacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.capacity, 128);
        assert_eq!(config.ttl_secs, 300);
    }

    #[test]
    fn test_disabled_cache_builds_none() {
        let toml_str = r#"
[cache]
enabled = false
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.cache.to_cache().is_none());
    }

    #[test]
    fn test_enabled_cache_builds_some() {
        assert!(FileCacheConfig::default().to_cache().is_some());
    }
}
