//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod alert_escalator;
pub mod alert_refresh;
pub mod audit_logger;
pub mod input_guard;
pub mod model_fallback;
pub mod orchestrator;
pub mod response_validator;
pub mod session_service;
pub mod tool_invoker;
