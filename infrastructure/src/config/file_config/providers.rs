//! Model provider configuration (`[providers]`)
//!
//! ```toml
//! [providers.primary]
//! kind = "gemini"
//! model = "gemini-2.5-flash"
//!
//! [providers.fallback]
//! kind = "openai"
//! model = "gpt-4o-mini"
//! ```

use haven_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// "openai" (any Chat Completions compatible endpoint) or "gemini"
    pub kind: String,
    pub model: String,
    /// Override of the provider's default base URL
    pub base_url: Option<String>,
    /// Environment variable holding the API key (default depends on kind)
    pub api_key_env: Option<String>,
    /// HTTP request timeout in seconds (default: 60)
    pub request_timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            kind: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: None,
            api_key_env: None,
            request_timeout_secs: 60,
            max_tokens: 2048,
        }
    }
}

impl FileProviderConfig {
    /// Name of the variable the API key is read from.
    pub fn key_variable(&self) -> String {
        if let Some(var) = &self.api_key_env {
            return var.clone();
        }
        match self.kind.as_str() {
            "openai" => "OPENAI_API_KEY".to_string(),
            _ => "GEMINI_API_KEY".to_string(),
        }
    }

    fn validate(
        &self,
        section: &str,
        lookup: &dyn Fn(&str) -> Option<String>,
        missing_key_is_error: bool,
    ) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if !matches!(self.kind.as_str(), "openai" | "gemini") {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownProvider,
                format!(
                    "{}.kind: unknown provider '{}' (expected openai or gemini)",
                    section, self.kind
                ),
            ));
        }
        let var = self.key_variable();
        if lookup(&var).is_none_or(|v| v.is_empty()) {
            let message = format!("{}: API key variable {} is not set", section, var);
            issues.push(if missing_key_is_error {
                ConfigIssue::error(ConfigIssueCode::MissingApiKey, message)
            } else {
                ConfigIssue::warning(ConfigIssueCode::MissingApiKey, message)
            });
        }
        if self.request_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                format!("{}.request_timeout_secs cannot be 0", section),
            ));
        }
        issues
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub primary: FileProviderConfig,
    pub fallback: Option<FileProviderConfig>,
}

impl FileProvidersConfig {
    pub fn validate(&self, lookup: &dyn Fn(&str) -> Option<String>) -> Vec<ConfigIssue> {
        let mut issues = self.primary.validate("providers.primary", lookup, true);
        if let Some(fallback) = &self.fallback {
            issues.extend(fallback.validate("providers.fallback", lookup, false));
            if fallback.kind == self.primary.kind && fallback.model == self.primary.model {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::FallbackSameAsPrimary,
                    "providers.fallback is the same provider and model as the primary",
                ));
            }
        }
        issues
    }
}
