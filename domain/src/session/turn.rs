//! One user turn and everything the pipeline decided about it.
//!
//! A [`Turn`] is assembled by a [`TurnBuilder`] while the pipeline runs and
//! is immutable once built: the audit log and the session history both hold
//! the finished value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::SessionId;
use crate::guard::GuardVerdict;
use crate::hazard::AlertSnapshot;
use crate::tool::record::ToolCallRecord;
use crate::validation::ValidationVerdict;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    session_id: SessionId,
    sequence: u64,
    user_text: String,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    guard_verdict: GuardVerdict,
    tool_calls: Vec<ToolCallRecord>,
    /// Released answer; only ever set for accepted turns
    final_response: Option<String>,
    /// Text shown for refused turns
    refusal_message: Option<String>,
    /// None for refused turns
    validation: Option<ValidationVerdict>,
    /// Provider that produced the last model step
    provider: Option<String>,
    /// Provider of every model step, in order
    #[serde(default)]
    providers: Vec<String>,
    alert: Option<AlertSnapshot>,
    regenerations: u32,
}

impl Turn {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn guard_verdict(&self) -> &GuardVerdict {
        &self.guard_verdict
    }

    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        &self.tool_calls
    }

    pub fn final_response(&self) -> Option<&str> {
        self.final_response.as_deref()
    }

    pub fn refusal_message(&self) -> Option<&str> {
        self.refusal_message.as_deref()
    }

    pub fn validation(&self) -> Option<&ValidationVerdict> {
        self.validation.as_ref()
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// True when any step of the turn was served by `provider`.
    pub fn served_by(&self, provider: &str) -> bool {
        self.providers.iter().any(|p| p == provider)
    }

    pub fn alert(&self) -> Option<&AlertSnapshot> {
        self.alert.as_ref()
    }

    pub fn regenerations(&self) -> u32 {
        self.regenerations
    }

    /// What the user sees: the released answer or the refusal text.
    pub fn reply_text(&self) -> &str {
        self.final_response
            .as_deref()
            .or(self.refusal_message.as_deref())
            .unwrap_or_default()
    }
}

/// Mutable in-flight state of a turn.
#[derive(Debug, Clone)]
pub struct TurnBuilder {
    session_id: SessionId,
    sequence: u64,
    user_text: String,
    started_at: DateTime<Utc>,
    tool_calls: Vec<ToolCallRecord>,
    providers: Vec<String>,
    alert: Option<AlertSnapshot>,
    regenerations: u32,
}

impl TurnBuilder {
    pub fn new(session_id: SessionId, sequence: u64, user_text: impl Into<String>) -> Self {
        Self {
            session_id,
            sequence,
            user_text: user_text.into(),
            started_at: Utc::now(),
            tool_calls: Vec::new(),
            providers: Vec::new(),
            alert: None,
            regenerations: 0,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Append a record. Records are never reordered or removed.
    pub fn push_record(&mut self, record: ToolCallRecord) {
        self.tool_calls.push(record);
    }

    pub fn records(&self) -> &[ToolCallRecord] {
        &self.tool_calls
    }

    /// Record the provider that served one model step.
    pub fn note_provider(&mut self, provider: impl Into<String>) {
        self.providers.push(provider.into());
    }

    pub fn set_alert(&mut self, snapshot: AlertSnapshot) {
        self.alert = Some(snapshot);
    }

    pub fn note_regeneration(&mut self) {
        self.regenerations += 1;
    }

    pub fn regenerations(&self) -> u32 {
        self.regenerations
    }

    /// Finish an accepted turn with its released text and verdict.
    pub fn answered(
        self,
        guard: GuardVerdict,
        response: impl Into<String>,
        verdict: ValidationVerdict,
    ) -> Turn {
        debug_assert!(guard.is_accepted());
        self.finish(guard, Some(response.into()), None, Some(verdict))
    }

    /// Finish a refused turn; no tool records, no response, no verdict.
    pub fn refused(self, guard: GuardVerdict, refusal: impl Into<String>) -> Turn {
        debug_assert!(!guard.is_accepted());
        self.finish(guard, None, Some(refusal.into()), None)
    }

    /// Finish a turn cancelled before the guard reached a verdict.
    ///
    /// Like a refusal it carries no released response, but it keeps the
    /// `cancelled` marker so the audit trail shows why it stopped.
    pub fn interrupted(
        self,
        guard: GuardVerdict,
        notice: impl Into<String>,
        marker: ValidationVerdict,
    ) -> Turn {
        debug_assert!(!guard.is_accepted());
        self.finish(guard, None, Some(notice.into()), Some(marker))
    }

    fn finish(
        self,
        guard_verdict: GuardVerdict,
        final_response: Option<String>,
        refusal_message: Option<String>,
        validation: Option<ValidationVerdict>,
    ) -> Turn {
        Turn {
            session_id: self.session_id,
            sequence: self.sequence,
            user_text: self.user_text,
            started_at: self.started_at,
            completed_at: Utc::now(),
            guard_verdict,
            tool_calls: self.tool_calls,
            final_response,
            refusal_message,
            validation,
            provider: self.providers.last().cloned(),
            providers: self.providers,
            alert: self.alert,
            regenerations: self.regenerations,
        }
    }
}
