//! Query value object

use serde::{Deserialize, Serialize};

/// A query routed through the gateway or put before the council (Value Object)
///
/// Wraps the raw user prompt so the rest of the system never handles
/// unvalidated empty input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    content: String,
}

impl Query {
    /// Create a new query
    ///
    /// # Panics
    /// Panics if the content is empty or only whitespace
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        assert!(!content.trim().is_empty(), "Query cannot be empty");
        Self { content }
    }

    /// Try to create a new query, returning None if invalid
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the query content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for Query {
    fn from(s: &str) -> Self {
        Query::new(s)
    }
}

impl From<String> for Query {
    fn from(s: String) -> Self {
        Query::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let q = Query::new("Summarize this incident report");
        assert_eq!(q.content(), "Summarize this incident report");
    }

    #[test]
    fn test_query_from_str() {
        let q: Query = "Summarize this incident report".into();
        assert_eq!(q.content(), "Summarize this incident report");
    }

    #[test]
    #[should_panic]
    fn test_empty_query_panics() {
        Query::new("  ");
    }

    #[test]
    fn test_try_new_empty() {
        assert!(Query::try_new("").is_none());
        assert!(Query::try_new("   ").is_none());
    }

    #[test]
    fn test_try_new_valid() {
        assert!(Query::try_new("hello").is_some());
    }
}
