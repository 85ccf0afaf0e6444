//! Tool domain value objects: structured tool errors.
//!
//! Every failure of a tool call is one of three kinds, and the kind drives
//! the invoker's retry behaviour:
//!
//! | Kind | Retried? | Typical cause |
//! |------|----------|---------------|
//! | `invalid-arguments` | No | Schema violation, unknown tool |
//! | `tool-unavailable` | Yes | Timeout, connection refused, 5xx |
//! | `upstream-error` | No | Place not found, malformed upstream payload |

use serde::{Deserialize, Serialize};

/// Kind of a tool failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolErrorKind {
    InvalidArguments,
    ToolUnavailable,
    UpstreamError,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ToolErrorKind::InvalidArguments => "invalid-arguments",
            ToolErrorKind::ToolUnavailable => "tool-unavailable",
            ToolErrorKind::UpstreamError => "upstream-error",
        }
    }

    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ToolErrorKind::ToolUnavailable)
    }
}

impl std::fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error that occurred during tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ToolUnavailable, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::UpstreamError, message)
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::upstream(format!("Not found: {}", resource.into()))
    }

    pub fn timeout(tool_name: &str, attempts: u32) -> Self {
        Self::unavailable(format!(
            "{} timed out after {} attempt(s)",
            tool_name, attempts
        ))
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ToolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_kebab_case() {
        let err = ToolError::unavailable("connection refused");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "tool-unavailable");
        assert_eq!(err.to_string(), "[tool-unavailable] connection refused");
    }

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(ToolErrorKind::ToolUnavailable.is_transient());
        assert!(!ToolErrorKind::InvalidArguments.is_transient());
        assert!(!ToolErrorKind::UpstreamError.is_transient());
    }

    #[test]
    fn test_not_found_is_upstream() {
        let err = ToolError::not_found("Atlantis");
        assert_eq!(err.kind, ToolErrorKind::UpstreamError);
        assert!(err.message.contains("Atlantis"));
    }
}
