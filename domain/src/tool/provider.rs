//! Tool provider abstraction
//!
//! A [`ToolProvider`] is a backend that can execute one or more tools
//! (weather service, geocoder, routing service). Providers are plugged into
//! the infrastructure `ToolRegistry`, which routes calls by tool name.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 ToolRegistry                 │
//! │   (aggregates providers, routes by priority) │
//! └──────────────────────────────────────────────┘
//!          │               │               │
//!          ▼               ▼               ▼
//!   ┌────────────┐  ┌────────────┐  ┌────────────┐
//!   │  Weather   │  │  Geocoder  │  │  Routing   │
//!   │  (NWS)     │  │  (Google)  │  │  service   │
//!   └────────────┘  └────────────┘  └────────────┘
//! ```
//!
//! When two providers offer the same tool, the one with the higher
//! [`priority`](ToolProvider::priority) wins.

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{ToolCall, ToolDefinition};
use super::value_objects::ToolError;

/// Error type for tool provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider is not configured (e.g., missing API key)
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Backend that executes tool calls.
///
/// `execute` returns the raw result record; schema checks, timeouts and
/// retries are applied by the caller.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Unique identifier for this provider (e.g., "nws", "google-geocoding")
    fn id(&self) -> &str;

    /// Priority for tool resolution (higher = preferred)
    fn priority(&self) -> i32 {
        0
    }

    /// Whether the provider is configured and usable
    async fn is_available(&self) -> bool {
        true
    }

    /// Tools this provider can execute
    fn tools(&self) -> Vec<ToolDefinition>;

    /// Execute a tool call
    async fn execute(&self, call: &ToolCall) -> Result<serde_json::Value, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct MockProvider {
        available: bool,
    }

    #[async_trait]
    impl ToolProvider for MockProvider {
        fn id(&self) -> &str {
            "mock"
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        fn tools(&self) -> Vec<ToolDefinition> {
            vec![ToolDefinition::new("geocode", "Mock geocoder")]
        }

        async fn execute(&self, call: &ToolCall) -> Result<serde_json::Value, ToolError> {
            match call.get_string("place_name") {
                Some("Miami") => Ok(json!({"latitude": 25.76, "longitude": -80.19})),
                Some(other) => Err(ToolError::not_found(other)),
                None => Err(ToolError::invalid_arguments("place_name missing")),
            }
        }
    }

    #[tokio::test]
    async fn test_provider_defaults() {
        let provider = MockProvider { available: true };
        assert_eq!(provider.priority(), 0);
        assert!(provider.is_available().await);
        assert_eq!(provider.tools().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_execute() {
        let provider = MockProvider { available: false };
        assert!(!provider.is_available().await);

        let ok = provider
            .execute(&ToolCall::new("c1", "geocode").with_arg("place_name", "Miami"))
            .await
            .unwrap();
        assert_eq!(ok["latitude"], 25.76);

        let err = provider
            .execute(&ToolCall::new("c2", "geocode").with_arg("place_name", "Atlantis"))
            .await
            .unwrap_err();
        assert!(err.message.contains("Atlantis"));
    }
}
