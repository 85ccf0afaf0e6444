//! Orchestrator parameters: turn pipeline control.
//!
//! [`OrchestratorParams`] groups the static limits that bound one turn:
//! how many tool rounds it may take, how many regenerations a rejected
//! draft gets, and how long a provider may think. These are
//! application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Turn pipeline limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorParams {
    /// Maximum tool rounds in one turn before giving up.
    pub max_tool_turns: usize,
    /// Regenerations allowed after a draft fails validation.
    pub max_regenerations: u32,
    /// Timeout for each provider call.
    pub model_timeout: Duration,
    /// Previous turns replayed into the model context.
    pub history_turns: usize,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            max_tool_turns: 5,
            max_regenerations: 1,
            model_timeout: Duration::from_secs(30),
            history_turns: 6,
        }
    }
}

impl OrchestratorParams {
    // ==================== Builder Methods ====================

    pub fn with_max_tool_turns(mut self, max: usize) -> Self {
        self.max_tool_turns = max;
        self
    }

    pub fn with_max_regenerations(mut self, max: u32) -> Self {
        self.max_regenerations = max;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }
}

/// Input guard limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardParams {
    /// Longest accepted input, in characters.
    pub max_input_chars: usize,
    /// Timeout for the topical classifier.
    pub classifier_timeout: Duration,
}

impl Default for GuardParams {
    fn default() -> Self {
        Self {
            max_input_chars: 4000,
            classifier_timeout: Duration::from_secs(10),
        }
    }
}
