//! Domain layer for haven
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Turn pipeline
//!
//! Every user message becomes a [`Turn`]: it is screened ([`GuardVerdict`]),
//! answered with the help of tools ([`ToolCallRecord`]), checked
//! ([`ValidationVerdict`]) and written to the audit log exactly once.
//!
//! ## Alerts
//!
//! Each location has an [`AlertState`] (`none`, `advisory`,
//! `active-hazard`) driven only by weather lookups. An active hazard makes
//! an evacuation route mandatory for the turn.

pub mod config;
pub mod core;
pub mod guard;
pub mod hazard;
pub mod prompt;
pub mod session;
pub mod tool;
pub mod validation;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::error::DomainError;
pub use guard::{GuardKind, GuardVerdict, Topic};
pub use hazard::{
    AlertLevel, AlertSnapshot, AlertState, AlertTransition, Coordinates, LocationKey, RoutePlan,
    WeatherReport,
};
pub use prompt::PromptTemplate;
pub use session::{
    ConversationContext, Message, ModelReply, Role, Session, SessionId, Turn, TurnBuilder,
};
pub use tool::{
    DefaultToolValidator, ParamType, RetryPolicy, ToolCall, ToolCallRecord, ToolDefinition,
    ToolError, ToolErrorKind, ToolOutcome, ToolParameter, ToolSpec, ToolValidator,
};
pub use validation::{ValidationVerdict, VerdictKind};
