//! Infrastructure layer for haven
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration loading, JSONL audit sinks,
//! HTTP model providers, HTTP tool backends and topic classifiers.

pub mod classifier;
pub mod config;
pub mod logging;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use classifier::{KeywordClassifier, ModelClassifier};
pub use config::{ClassifierKind, ConfigLoader, ConfigValidationError, FileConfig};
pub use logging::JsonlAuditSink;
pub use providers::{GeminiAdapter, OpenAiAdapter, ProviderKind, build_adapter};
pub use tools::{ToolRegistry, build_registry, catalog_spec};
