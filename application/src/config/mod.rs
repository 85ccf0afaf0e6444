//! Application-level configuration.
//!
//! - [`OrchestratorParams`]: turn pipeline limits (tool rounds, regenerations, timeouts)
//! - [`GuardParams`]: input guard limits
//!
//! Validator and alert-refresh settings live beside their use cases
//! ([`ValidatorPolicy`](crate::use_cases::response_validator::ValidatorPolicy),
//! [`RefreshParams`](crate::use_cases::alert_refresh::RefreshParams)).

pub mod orchestrator_params;

pub use orchestrator_params::{GuardParams, OrchestratorParams};
