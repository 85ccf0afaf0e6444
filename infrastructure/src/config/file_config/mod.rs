//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use application types where the
//! shapes coincide (`[validator]`, `[alerts]`).

mod audit;
mod orchestrator;
mod providers;
mod services;
mod tools;

pub use audit::{FileAuditConfig, FileLoggingConfig};
pub use orchestrator::{ClassifierKind, FileGuardConfig, FileOrchestratorConfig};
pub use providers::{FileProviderConfig, FileProvidersConfig};
pub use services::FileServicesConfig;
pub use tools::{FileToolPolicy, FileToolsConfig};

use haven_application::{RefreshParams, ValidatorPolicy};
use haven_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub orchestrator: FileOrchestratorConfig,
    pub guard: FileGuardConfig,
    /// Per-tool retry overrides
    pub tools: FileToolsConfig,
    /// Response validator lexicons and thresholds
    pub validator: ValidatorPolicy,
    /// Background alert refresh
    pub alerts: RefreshParams,
    pub audit: FileAuditConfig,
    pub providers: FileProvidersConfig,
    /// Weather, geocoding and routing endpoints
    pub services: FileServicesConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration against the process environment.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        self.validate_with(&|name| std::env::var(name).ok())
    }

    /// Validate, resolving API key variables through `lookup`.
    pub fn validate_with(&self, lookup: &dyn Fn(&str) -> Option<String>) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.orchestrator.validate());
        issues.extend(self.guard.validate());
        issues.extend(self.tools.validate(&crate::tools::catalog_spec()));
        issues.extend(self.providers.validate(lookup));

        // Validator thresholds
        let v = &self.validator;
        if v.max_sentence_words == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                "validator.max_sentence_words must be at least 1",
            ));
        }
        if v.max_avg_sentence_words > v.max_sentence_words as f64 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InconsistentThreshold,
                format!(
                    "validator.max_avg_sentence_words ({}) exceeds max_sentence_words ({}) and can never trigger",
                    v.max_avg_sentence_words, v.max_sentence_words
                ),
            ));
        }
        if v.on_topic_terms.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InconsistentThreshold,
                "validator.on_topic_terms is empty; every draft will be rejected as irrelevant",
            ));
        }

        if self.alerts.enabled && self.alerts.interval.is_zero() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                "alerts.interval cannot be 0 while refresh is enabled",
            ));
        }

        if self.audit.resolved_path() == self.audit.resolved_fallback_path() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::AuditPathsCollide,
                "audit.path and audit.fallback_path must differ",
            ));
        }

        if self.services.route_url.is_none() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::MissingEndpoint,
                "services.route_url is not set; evacuation routes will be unavailable",
            ));
        }
        if lookup(&self.services.geocode_api_key_env).is_none_or(|v| v.is_empty()) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::MissingApiKey,
                format!(
                    "services: geocoding key variable {} is not set",
                    self.services.geocode_api_key_env
                ),
            ));
        }

        issues
    }
}
