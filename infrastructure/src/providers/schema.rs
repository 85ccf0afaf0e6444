//! JSON Schema for tool parameters.
//!
//! Both provider shims describe tools with the same provider-neutral
//! object schema built from a [`ToolDefinition`]'s parameters.

use haven_domain::ToolDefinition;
use serde_json::{Map, Value, json};

/// `{"type": "object", "properties": {...}, "required": [...]}`
pub fn parameters_schema(tool: &ToolDefinition) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &tool.parameters {
        properties.insert(
            param.name.clone(),
            json!({
                "type": param.param_type.as_str(),
                "description": param.description,
            }),
        );
        if param.required {
            required.push(json!(param.name));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
