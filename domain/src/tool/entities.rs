//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default per-attempt timeout for a tool call.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(10);

/// Default base delay of the exponential backoff between attempts.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(250);

/// JSON value type accepted by a tool parameter or produced in a tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    pub fn as_str(&self) -> &str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }

    /// Whether `value` has this type.
    ///
    /// Integers are accepted where a number is expected.
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Object => value.is_object(),
            ParamType::Array => value.is_array(),
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameter (or output field) specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Value type
    pub param_type: ParamType,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: ParamType::String,
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }
}

/// Timeout and retry policy attached to a tool descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Retries after the first attempt (total attempts = max_retries + 1)
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further retry
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TOOL_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    /// Total number of attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Backoff delay before retry number `retry` (1-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << exp)
    }
}

/// Descriptor of a callable capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "weather_lookup")
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    /// Input schema
    pub parameters: Vec<ToolParameter>,
    /// Output schema; fields marked required must be present in every result
    pub outputs: Vec<ToolParameter>,
    /// Timeout and retry policy
    pub policy: RetryPolicy,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            outputs: Vec::new(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_output(mut self, field: ToolParameter) -> Self {
        self.outputs.push(field);
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Registry of available tool descriptors
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: HashMap<String, ToolDefinition>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a descriptor. A later registration under the same name
    /// replaces the earlier one, so names stay unique.
    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ToolDefinition> {
        self.tools.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    /// Descriptors sorted by name, for deterministic prompts.
    pub fn sorted(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A call to a tool with named arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id (provider-assigned, or generated for injected calls)
    pub id: String,
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.arguments.get(key).and_then(|v| v.as_f64())
    }

    /// Get a required string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get a required numeric argument or return an error message
    pub fn require_f64(&self, key: &str) -> Result<f64, String> {
        self.get_f64(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_type_matches() {
        assert!(ParamType::Number.matches(&json!(3)));
        assert!(ParamType::Number.matches(&json!(3.5)));
        assert!(ParamType::Integer.matches(&json!(3)));
        assert!(!ParamType::Integer.matches(&json!(3.5)));
        assert!(!ParamType::String.matches(&json!(1)));
        assert!(ParamType::Array.matches(&json!([1, 2])));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            timeout: Duration::from_secs(1),
            max_retries: 3,
            backoff_base: Duration::from_millis(100),
        };
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new("geocode", "Resolve a place name")
            .with_parameter(ToolParameter::new("place_name", "Place to resolve", true))
            .with_output(
                ToolParameter::new("latitude", "Latitude", true).with_type(ParamType::Number),
            );

        assert_eq!(tool.name, "geocode");
        assert_eq!(tool.parameters.len(), 1);
        assert!(tool.parameter("place_name").unwrap().required);
        assert_eq!(tool.policy.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_tool_spec_names_are_unique() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("geocode", "first"))
            .register(ToolDefinition::new("geocode", "second"))
            .register(ToolDefinition::new("weather_lookup", "weather"));

        assert_eq!(spec.len(), 2);
        assert_eq!(spec.get("geocode").unwrap().description, "second");
        assert!(spec.get("unknown").is_none());
        let names: Vec<_> = spec.sorted().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["geocode", "weather_lookup"]);
    }

    #[test]
    fn test_tool_call() {
        let call = ToolCall::new("call_1", "weather_lookup")
            .with_arg("latitude", 25.76)
            .with_arg("longitude", -80.19);

        assert_eq!(call.require_f64("latitude").unwrap(), 25.76);
        assert!(call.require_string("latitude").is_err());
        assert!(call.require_f64("missing").is_err());
    }
}
