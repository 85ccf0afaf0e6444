//! Tool domain traits
//!
//! Pure schema validation of tool inputs and outputs. The async execution
//! port lives in the application layer.

use super::entities::{ToolCall, ToolDefinition};

/// Validator for tool calls and tool results
pub trait ToolValidator {
    /// Validate a call's arguments against its definition's input schema
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String>;

    /// Validate a result value against the definition's output schema
    fn validate_output(
        &self,
        output: &serde_json::Value,
        definition: &ToolDefinition,
    ) -> Result<(), String>;
}

/// Default schema validator: required presence, no unknown parameters,
/// and type conformance for every provided value.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String> {
        for param in &definition.parameters {
            match call.arguments.get(&param.name) {
                None | Some(serde_json::Value::Null) if param.required => {
                    return Err(format!(
                        "Missing required parameter '{}' for tool '{}'",
                        param.name, definition.name
                    ));
                }
                Some(value) if !value.is_null() && !param.param_type.matches(value) => {
                    return Err(format!(
                        "Parameter '{}' for tool '{}' must be of type {}",
                        param.name, definition.name, param.param_type
                    ));
                }
                _ => {}
            }
        }

        for arg_name in call.arguments.keys() {
            if definition.parameter(arg_name).is_none() {
                return Err(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    arg_name, definition.name
                ));
            }
        }

        Ok(())
    }

    fn validate_output(
        &self,
        output: &serde_json::Value,
        definition: &ToolDefinition,
    ) -> Result<(), String> {
        let Some(fields) = output.as_object() else {
            return Err(format!("Tool '{}' returned a non-object result", definition.name));
        };

        for field in &definition.outputs {
            match fields.get(&field.name) {
                None | Some(serde_json::Value::Null) if field.required => {
                    return Err(format!(
                        "Tool '{}' result is missing field '{}'",
                        definition.name, field.name
                    ));
                }
                Some(value) if !value.is_null() && !field.param_type.matches(value) => {
                    return Err(format!(
                        "Tool '{}' result field '{}' must be of type {}",
                        definition.name, field.name, field.param_type
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
