//! Role value object used for fallback-chain selection

use serde::{Deserialize, Serialize};

/// A logical request category (Value Object)
///
/// Roles such as "developer" or "analyst" select which fallback chain the
/// gateway walks. Stored normalized (trimmed, lowercase) so lookups never
/// depend on caller casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Create a new role
    ///
    /// # Panics
    /// Panics if the name is empty or only whitespace
    pub fn new(name: impl Into<String>) -> Self {
        let normalized = Self::normalize(name.into());
        assert!(!normalized.is_empty(), "Role cannot be empty");
        Self(normalized)
    }

    /// Try to create a new role, returning None if invalid
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let normalized = Self::normalize(name.into());
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    fn normalize(raw: String) -> String {
        raw.trim().to_lowercase()
    }

    /// Get the normalized role name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role::new(s)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::new(s)
    }
}
