//! Turn pipeline and guard configuration (`[orchestrator]`, `[guard]`)

use haven_application::{GuardParams, OrchestratorParams};
use haven_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    /// Tool rounds per turn before the turn is finalized (default: 5)
    pub max_tool_turns: usize,
    /// Regenerations after a rejected draft (default: 1)
    pub max_regenerations: u32,
    /// Per-call provider timeout in seconds (default: 30)
    pub model_timeout_secs: u64,
    /// Earlier turns replayed to the model (default: 6)
    pub history_turns: usize,
}

impl Default for FileOrchestratorConfig {
    fn default() -> Self {
        let params = OrchestratorParams::default();
        Self {
            max_tool_turns: params.max_tool_turns,
            max_regenerations: params.max_regenerations,
            model_timeout_secs: params.model_timeout.as_secs(),
            history_turns: params.history_turns,
        }
    }
}

impl FileOrchestratorConfig {
    pub fn to_params(&self) -> OrchestratorParams {
        OrchestratorParams::default()
            .with_max_tool_turns(self.max_tool_turns)
            .with_max_regenerations(self.max_regenerations)
            .with_model_timeout(Duration::from_secs(self.model_timeout_secs))
            .with_history_turns(self.history_turns)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_tool_turns == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                "orchestrator.max_tool_turns must be at least 1",
            ));
        }
        if self.model_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                "orchestrator.model_timeout_secs cannot be 0",
            ));
        }
        issues
    }
}

/// Which topic classifier screens user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Regex rule matcher, no network
    #[default]
    Keyword,
    /// Single-label classification by the primary provider
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGuardConfig {
    pub classifier: ClassifierKind,
    /// Longest accepted input in characters (default: 4000)
    pub max_input_chars: usize,
    /// Classifier timeout in seconds (default: 10)
    pub classifier_timeout_secs: u64,
    /// Extra regexes whose match marks input as unrelated (keyword classifier only)
    pub extra_unrelated_patterns: Vec<String>,
}

impl Default for FileGuardConfig {
    fn default() -> Self {
        let params = GuardParams::default();
        Self {
            classifier: ClassifierKind::default(),
            max_input_chars: params.max_input_chars,
            classifier_timeout_secs: params.classifier_timeout.as_secs(),
            extra_unrelated_patterns: Vec::new(),
        }
    }
}

impl FileGuardConfig {
    pub fn to_params(&self) -> GuardParams {
        GuardParams {
            max_input_chars: self.max_input_chars,
            classifier_timeout: Duration::from_secs(self.classifier_timeout_secs),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_input_chars == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                "guard.max_input_chars must be at least 1",
            ));
        }
        if self.classifier_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                "guard.classifier_timeout_secs cannot be 0",
            ));
        }
        for pattern in &self.extra_unrelated_patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidPattern,
                    format!("guard.extra_unrelated_patterns: '{}' is not a valid regex: {}", pattern, e),
                ));
            }
        }
        issues
    }
}
