//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod audit_sink;
pub mod model_adapter;
pub mod tool_executor;
pub mod topic_classifier;
