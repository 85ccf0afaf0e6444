//! Structured configuration issues.
//!
//! Config loading produces a list of [`ConfigIssue`]s instead of failing on
//! the first problem. Callers abort on any [`Severity::Error`] and log the
//! warnings.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A count or duration that must be positive is zero.
    ZeroLimit,
    /// A provider kind string is not recognized.
    UnknownProvider,
    /// The provider's API key variable is unset.
    MissingApiKey,
    /// Primary and fallback point at the same provider and model.
    FallbackSameAsPrimary,
    /// A per-tool override names a tool that does not exist.
    UnknownTool,
    /// An external service endpoint is not configured.
    MissingEndpoint,
    /// A regular expression in the guard rules does not compile.
    InvalidPattern,
    /// Primary and secondary audit paths are identical.
    AuditPathsCollide,
    /// A validator threshold contradicts another.
    InconsistentThreshold,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_display() {
        let issue = ConfigIssue::error(ConfigIssueCode::ZeroLimit, "max_tool_turns must be > 0");
        assert!(issue.is_error());
        assert_eq!(issue.to_string(), "error: max_tool_turns must be > 0");

        let warn = ConfigIssue::warning(ConfigIssueCode::MissingApiKey, "GEMINI_API_KEY unset");
        assert!(!warn.is_error());
        assert!(warn.to_string().starts_with("warning"));
    }
}
