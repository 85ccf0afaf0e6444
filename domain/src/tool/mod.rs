//! Tool domain module
//!
//! Defines how the assistant reaches live data: every capability is a
//! [`ToolDefinition`] (name, input schema, output schema, retry policy),
//! invoked through a [`ToolCall`], and leaves behind an immutable
//! [`ToolCallRecord`].
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌────────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolCallRecord │
//! │ (registry)   │    │ (invocation) │    │ (audit)        │
//! └──────────────┘    └──────────────┘    └────────────────┘
//! ```
//!
//! # Layering
//!
//! - **Domain** (this module): descriptors, schema validation, records
//! - **Application** (`ToolExecutorPort`, `ToolInvoker`): timeouts, retries
//! - **Infrastructure** (`ToolRegistry` + providers): HTTP backends

pub mod catalog;
pub mod entities;
pub mod provider;
pub mod record;
pub mod traits;
pub mod value_objects;

pub use entities::{ParamType, RetryPolicy, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use provider::{ProviderError, ToolProvider};
pub use record::{ToolCallRecord, ToolOutcome};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolErrorKind};
