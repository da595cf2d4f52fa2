//! Structured configuration issues.
//!
//! Config loading never aborts on a questionable value; instead validation
//! collects [`ConfigIssue`]s so the caller can decide whether to warn and
//! continue or refuse to start.
//!
//! # Examples
//!
//! ```
//! use conclave_domain::core::validation::{ConfigIssue, Severity};
//!
//! let issue = ConfigIssue::warning("council.chairman", "chairman is not a participant");
//! assert_eq!(issue.severity, Severity::Warning);
//! ```

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// A detected issue in the loaded configuration.
///
/// `field` is the TOML path that triggered the issue (e.g. `roles.code.chain`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for issues that should prevent startup.
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{tag}: {}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_constructor() {
        let issue = ConfigIssue::warning("gateway.default", "responder 'x' is not defined");
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.field, "gateway.default");
        assert!(!issue.is_fatal());
    }

    #[test]
    fn test_error_is_fatal() {
        let issue = ConfigIssue::error("responders", "no responders are enabled");
        assert!(issue.is_fatal());
    }

    #[test]
    fn test_display_format() {
        let issue = ConfigIssue::warning("roles.code.chain", "unknown responder 'ghost'");
        assert_eq!(
            issue.to_string(),
            "warning: roles.code.chain: unknown responder 'ghost'"
        );
    }
}
