//! Language-model provider adapters.
//!
//! Each adapter turns the provider-neutral [`ConversationContext`] into one
//! provider's wire format and maps the answer back to a [`ModelReply`].
//!
//! [`ConversationContext`]: haven_domain::ConversationContext
//! [`ModelReply`]: haven_domain::ModelReply

pub mod gemini;
pub mod openai;
pub mod schema;

use crate::config::FileProviderConfig;
use haven_application::{ModelAdapter, ModelError};
use std::sync::Arc;
use std::time::Duration;

pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "openai" => Some(Self::OpenAi),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => openai::DEFAULT_BASE_URL,
            Self::Gemini => gemini::DEFAULT_BASE_URL,
        }
    }
}

/// Connection settings shared by the HTTP adapters.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

/// Build the adapter a `[providers.*]` section describes.
///
/// The API key is read through `lookup` from the variable named by
/// [`FileProviderConfig::key_variable`].
pub fn build_adapter(
    config: &FileProviderConfig,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Arc<dyn ModelAdapter>, ModelError> {
    let kind = ProviderKind::parse(&config.kind)
        .ok_or_else(|| ModelError::NotConfigured(format!("unknown provider '{}'", config.kind)))?;
    let var = config.key_variable();
    let api_key = lookup(&var)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ModelError::NotConfigured(format!("{} is not set", var)))?;

    let settings = HttpSettings {
        base_url: config
            .base_url
            .clone()
            .unwrap_or_else(|| kind.default_base_url().to_string()),
        api_key,
        model: config.model.clone(),
        max_tokens: config.max_tokens,
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    };

    Ok(match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiAdapter::new(settings)?),
        ProviderKind::Gemini => Arc::new(GeminiAdapter::new(settings)?),
    })
}

fn classify_send_error(e: reqwest::Error) -> ModelError {
    if e.is_timeout() {
        ModelError::Timeout
    } else if e.is_connect() {
        ModelError::Connection(e.to_string())
    } else {
        ModelError::RequestFailed(e.to_string())
    }
}
