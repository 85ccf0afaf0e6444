//! Application layer for haven
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{GuardParams, OrchestratorParams};
pub use ports::{
    audit_sink::{AuditRecord, AuditSink, LoggingFailure, NoAuditSink},
    model_adapter::{ModelAdapter, ModelError},
    tool_executor::ToolExecutorPort,
    topic_classifier::{ClassifierError, TopicClassifier},
};
pub use use_cases::alert_escalator::{AlertEscalator, TrackedLocation, TurnAlertView};
pub use use_cases::alert_refresh::{AlertRefresher, RefreshParams, RefreshSummary};
pub use use_cases::audit_logger::{Ack, AuditLogger};
pub use use_cases::input_guard::InputGuard;
pub use use_cases::model_fallback::{ModelRouter, ProviderFailure, ServedReply};
pub use use_cases::orchestrator::Orchestrator;
pub use use_cases::response_validator::{ResponseValidator, ValidationContext, ValidatorPolicy};
pub use use_cases::session_service::{SessionError, SessionService};
pub use use_cases::tool_invoker::ToolInvoker;
