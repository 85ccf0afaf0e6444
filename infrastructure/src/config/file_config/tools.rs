//! Per-tool retry overrides (`[tools.<name>]`)
//!
//! ```toml
//! [tools.weather_lookup]
//! timeout_ms = 8000
//! max_retries = 3
//! backoff_ms = 500
//! ```
//!
//! Unset fields keep the tool's built-in policy.

use haven_domain::{ConfigIssue, ConfigIssueCode, RetryPolicy, ToolSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolPolicy {
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub backoff_ms: Option<u64>,
}

impl FileToolPolicy {
    /// Apply the set fields on top of `base`.
    pub fn apply(&self, base: RetryPolicy) -> RetryPolicy {
        RetryPolicy {
            timeout: self.timeout_ms.map(Duration::from_millis).unwrap_or(base.timeout),
            max_retries: self.max_retries.unwrap_or(base.max_retries),
            backoff_base: self
                .backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(base.backoff_base),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileToolsConfig {
    pub overrides: BTreeMap<String, FileToolPolicy>,
}

impl FileToolsConfig {
    /// Effective policies for the overridden tools that exist in `spec`.
    pub fn to_overrides(&self, spec: &ToolSpec) -> std::collections::HashMap<String, RetryPolicy> {
        self.overrides
            .iter()
            .filter_map(|(name, policy)| {
                let tool = spec.get(name)?;
                Some((name.clone(), policy.apply(tool.policy)))
            })
            .collect()
    }

    pub fn validate(&self, spec: &ToolSpec) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (name, policy) in &self.overrides {
            if !spec.contains(name) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownTool,
                    format!("[tools.{}] does not match any tool; ignored", name),
                ));
            }
            if policy.timeout_ms == Some(0) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroLimit,
                    format!("tools.{}.timeout_ms cannot be 0", name),
                ));
            }
        }
        issues
    }
}
