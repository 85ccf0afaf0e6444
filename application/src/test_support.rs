//! Hand-written port mocks shared by the use case tests.

use crate::ports::audit_sink::{AuditRecord, AuditSink, LoggingFailure};
use crate::ports::model_adapter::{ModelAdapter, ModelError};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::topic_classifier::{ClassifierError, TopicClassifier};
use async_trait::async_trait;
use haven_domain::tool::catalog;
use haven_domain::{
    ConversationContext, ModelReply, RetryPolicy, ToolCall, ToolDefinition, ToolError, ToolSpec,
    Topic,
};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ==================== Model ====================

/// Replays scripted replies in order and remembers every context it saw.
pub struct ScriptedModel {
    id: String,
    replies: Mutex<VecDeque<Result<ModelReply, ModelError>>>,
    pub contexts: Mutex<Vec<ConversationContext>>,
    delay: Option<Duration>,
}

impl ScriptedModel {
    pub fn new(id: &str, replies: Vec<Result<ModelReply, ModelError>>) -> Self {
        Self {
            id: id.to_string(),
            replies: Mutex::new(VecDeque::from(replies)),
            contexts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }

    pub fn last_context(&self) -> Option<ConversationContext> {
        self.contexts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelAdapter for ScriptedModel {
    fn provider_id(&self) -> &str {
        &self.id
    }

    async fn generate(
        &self,
        context: &ConversationContext,
        _tools: &[ToolDefinition],
    ) -> Result<ModelReply, ModelError> {
        self.contexts.lock().unwrap().push(context.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::RequestFailed("No more replies".to_string())))
    }
}

pub fn draft(text: &str) -> Result<ModelReply, ModelError> {
    Ok(ModelReply::Draft(text.to_string()))
}

pub fn tool_calls(calls: Vec<ToolCall>) -> Result<ModelReply, ModelError> {
    Ok(ModelReply::ToolCalls(calls))
}

// ==================== Tools ====================

type Handler = Box<dyn Fn(&ToolCall) -> Result<Value, ToolError> + Send + Sync>;

/// Tool backend with per-tool canned behavior and call counting.
pub struct FakeTools {
    spec: ToolSpec,
    handlers: HashMap<String, Handler>,
    hanging: Vec<String>,
    attempts: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl FakeTools {
    /// The three catalog tools, none of which answer until configured.
    pub fn new() -> Self {
        let spec = ToolSpec::new()
            .register(catalog::geocode_definition())
            .register(catalog::weather_lookup_definition())
            .register(catalog::route_suggestion_definition());
        Self {
            spec,
            handlers: HashMap::new(),
            hanging: Vec::new(),
            attempts: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
        }
    }

    pub fn on(
        mut self,
        tool: &str,
        handler: impl Fn(&ToolCall) -> Result<Value, ToolError> + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(tool.to_string(), Box::new(handler));
        self
    }

    /// The tool never completes; every attempt hits the timeout.
    pub fn hang(mut self, tool: &str) -> Self {
        self.hanging.push(tool.to_string());
        self
    }

    pub fn with_policy(mut self, tool: &str, policy: RetryPolicy) -> Self {
        if let Some(def) = self.spec.get_mut(tool) {
            def.policy = policy;
        }
        self
    }

    pub fn attempts(&self, tool: &str) -> usize {
        self.attempts.lock().unwrap().get(tool).copied().unwrap_or(0)
    }

    pub fn total_attempts(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Miami: geocode, active-hazard weather at 84°F, route to Orlando.
    pub fn miami() -> Self {
        Self::new()
            .on(catalog::GEOCODE, |_| Ok(miami_coordinates()))
            .on(catalog::WEATHER_LOOKUP, |_| {
                Ok(weather_json(84.0, "Hurricane Warning", "active-hazard"))
            })
            .on(catalog::ROUTE_SUGGESTION, |_| {
                Ok(json!({
                    "orderedWaypoints": ["I-95 North", "Florida Turnpike North"],
                    "estimatedSafeDestination": "Orlando"
                }))
            })
    }
}

#[async_trait]
impl ToolExecutorPort for FakeTools {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(call.tool_name.clone())
            .or_insert(0) += 1;

        if self.hanging.contains(&call.tool_name) {
            std::future::pending::<()>().await;
        }
        match self.handlers.get(&call.tool_name) {
            Some(handler) => handler(call),
            None => Err(ToolError::unavailable(format!(
                "no backend for {}",
                call.tool_name
            ))),
        }
    }
}

pub fn miami_coordinates() -> Value {
    json!({"latitude": 25.7617, "longitude": -80.1918})
}

pub fn weather_json(temperature: f64, conditions: &str, severity: &str) -> Value {
    json!({
        "temperature": temperature,
        "conditions": conditions,
        "alertSeverity": severity,
        "sourceTimestamp": "2026-10-15T12:00:00Z"
    })
}

pub fn geocode_call(id: &str, place: &str) -> ToolCall {
    ToolCall::new(id, catalog::GEOCODE).with_arg("placeName", place)
}

pub fn weather_call(id: &str, lat: f64, lon: f64) -> ToolCall {
    ToolCall::new(id, catalog::WEATHER_LOOKUP)
        .with_arg("latitude", lat)
        .with_arg("longitude", lon)
}

// ==================== Classifier ====================

pub struct FixedClassifier {
    result: Result<Topic, ClassifierError>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(topic: Topic) -> Self {
        Self {
            result: Ok(topic),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(ClassifierError::Unavailable("model down".to_string())),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every classification sleeps this long first, like a model round trip.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl TopicClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<Topic, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

/// Refuses anything mentioning "joke", accepts everything else as weather.
pub struct JokeAwareClassifier;

#[async_trait]
impl TopicClassifier for JokeAwareClassifier {
    async fn classify(&self, text: &str) -> Result<Topic, ClassifierError> {
        if text.to_lowercase().contains("joke") {
            Ok(Topic::Unrelated)
        } else {
            Ok(Topic::WeatherQuery)
        }
    }
}

// ==================== Audit ====================

#[derive(Default)]
pub struct MemorySink {
    pub records: Mutex<Vec<AuditRecord>>,
}

impl MemorySink {
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl AuditSink for MemorySink {
    fn append(&self, record: &AuditRecord) -> Result<(), LoggingFailure> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct FailingSink;

impl AuditSink for FailingSink {
    fn append(&self, _record: &AuditRecord) -> Result<(), LoggingFailure> {
        Err(LoggingFailure::Io("disk full".to_string()))
    }
}
