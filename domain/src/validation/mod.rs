//! Validation verdicts for released responses.
//!
//! The four validator outcomes share one field with the pipeline markers
//! that end a turn without a validated draft (`tool-loop-exceeded`,
//! `provider-unavailable`, `cancelled`).

use serde::{Deserialize, Serialize};

/// Reason attached when an active hazard is in effect and the draft names no route.
pub const MISSING_ROUTE: &str = "missing-route";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictKind {
    Pass,
    FailIrrelevant,
    FailUnclear,
    FailInconsistentWithTools,
    ToolLoopExceeded,
    ProviderUnavailable,
    Cancelled,
}

impl VerdictKind {
    pub fn as_str(&self) -> &str {
        match self {
            VerdictKind::Pass => "pass",
            VerdictKind::FailIrrelevant => "fail-irrelevant",
            VerdictKind::FailUnclear => "fail-unclear",
            VerdictKind::FailInconsistentWithTools => "fail-inconsistent-with-tools",
            VerdictKind::ToolLoopExceeded => "tool-loop-exceeded",
            VerdictKind::ProviderUnavailable => "provider-unavailable",
            VerdictKind::Cancelled => "cancelled",
        }
    }

    /// One of the validator's own failure outcomes.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            VerdictKind::FailIrrelevant
                | VerdictKind::FailUnclear
                | VerdictKind::FailInconsistentWithTools
        )
    }
}

impl std::fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub kind: VerdictKind,
    pub reason: String,
    /// The draft text that failed, retained for audit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offending_text: Option<String>,
}

impl ValidationVerdict {
    pub fn pass() -> Self {
        Self {
            kind: VerdictKind::Pass,
            reason: String::new(),
            offending_text: None,
        }
    }

    pub fn fail(kind: VerdictKind, reason: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            offending_text: Some(text.into()),
        }
    }

    pub fn marker(kind: VerdictKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            offending_text: None,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.kind == VerdictKind::Pass
    }
}
