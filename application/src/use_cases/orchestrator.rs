//! Orchestrator use case.
//!
//! Runs one user turn end to end and always produces a finished [`Turn`]:
//!
//! ```text
//! user text ─▶ InputGuard ──refused──────────────────────────────┐
//!                 │ accepted                                     │
//!                 ▼                                              │
//!          ┌─▶ ModelRouter ──tool calls──▶ ToolInvoker ─┐        │
//!          │      │ draft                               │        │
//!          │      ▼                   AlertEscalator ◀──┘        │
//!          │  ResponseValidator       (route injection)          │
//!          │      │ fail (≤ max_regenerations)                   │
//!          └──────┘                                              │
//!                 │ pass / fallback                              │
//!                 ▼                                              ▼
//!            AuditLogger ─────────────────────────────────▶ reply
//! ```
//!
//! The tool loop, regeneration and route injection share one bounded loop.
//! Exceeding `max_tool_turns` ends the turn with a fallback message and the
//! `tool-loop-exceeded` marker.

use crate::config::OrchestratorParams;
use crate::use_cases::alert_escalator::{AlertEscalator, TurnAlertView};
use crate::use_cases::audit_logger::AuditLogger;
use crate::use_cases::input_guard::InputGuard;
use crate::use_cases::model_fallback::ModelRouter;
use crate::use_cases::response_validator::{ResponseValidator, ValidationContext, safe_destination};
use crate::use_cases::tool_invoker::ToolInvoker;
use haven_domain::core::string::truncate;
use haven_domain::guard::reasons;
use haven_domain::tool::catalog;
use haven_domain::{
    ConversationContext, Coordinates, GuardVerdict, Message, ModelReply, PromptTemplate, Session,
    ToolCall, ToolCallRecord, ToolErrorKind, Turn, TurnBuilder, ValidationVerdict, VerdictKind,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Released text and the verdict it was released under.
type Outcome = (String, ValidationVerdict);

/// The session cancelled the turn while it was waiting on a model or tool.
struct Cancelled;

pub struct Orchestrator {
    guard: InputGuard,
    models: ModelRouter,
    invoker: Arc<ToolInvoker>,
    escalator: AlertEscalator,
    validator: ResponseValidator,
    audit: AuditLogger,
    params: OrchestratorParams,
}

impl Orchestrator {
    pub fn new(
        guard: InputGuard,
        models: ModelRouter,
        invoker: Arc<ToolInvoker>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            guard,
            models,
            invoker,
            escalator: AlertEscalator::new(),
            validator: ResponseValidator::default(),
            audit,
            params: OrchestratorParams::default(),
        }
    }

    /// Share an alert store (e.g. with the background refresher).
    pub fn with_escalator(mut self, escalator: AlertEscalator) -> Self {
        self.escalator = escalator;
        self
    }

    pub fn with_validator(mut self, validator: ResponseValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_params(mut self, params: OrchestratorParams) -> Self {
        self.params = params;
        self
    }

    pub fn escalator(&self) -> &AlertEscalator {
        &self.escalator
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Run one turn of `session`. The turn is appended to the session and
    /// submitted to the audit log before it is returned.
    pub async fn run_turn(
        &self,
        session: &mut Session,
        text: &str,
        cancel: &CancellationToken,
    ) -> Turn {
        let builder = TurnBuilder::new(session.id().clone(), session.next_sequence(), text);
        let seq = builder.sequence();
        info!(session = %session.id(), seq, "USER >> {}", truncate(text.trim(), 500));

        let guard_verdict = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            verdict = self.guard.evaluate(text) => Some(verdict),
        };
        let turn = match guard_verdict {
            Some(verdict) => self.finish_screened(session, builder, verdict, cancel).await,
            None => {
                info!(session = %session.id(), seq, "Turn cancelled during input screening");
                let (notice, marker) = cancelled_outcome();
                builder.interrupted(GuardVerdict::malformed(reasons::CANCELLED), notice, marker)
            }
        };

        self.audit.submit(&turn);
        if !session.push_turn(turn.clone()) {
            warn!(session = %session.id(), seq, "Turn out of sequence; not added to session history");
        }
        turn
    }

    /// Finish a turn whose input reached a guard verdict.
    async fn finish_screened(
        &self,
        session: &mut Session,
        mut builder: TurnBuilder,
        guard_verdict: GuardVerdict,
        cancel: &CancellationToken,
    ) -> Turn {
        let seq = builder.sequence();
        if guard_verdict.is_accepted() {
            let mut view = TurnAlertView::new();
            if let Some(at) = session.last_location() {
                view.focus(&self.escalator, at);
            }

            let (response, verdict) = self.answer(session, &mut builder, &mut view, cancel).await;

            if let Some(at) = view.location() {
                session.set_location(at);
            }
            if let Some(snapshot) = view.snapshot() {
                builder.set_alert(snapshot.clone());
            }
            info!(
                session = %session.id(),
                seq,
                verdict = %verdict.kind,
                tools = builder.records().len(),
                "MODEL >> {}",
                truncate(&response, 500)
            );
            builder.answered(guard_verdict, response, verdict)
        } else {
            info!(
                session = %session.id(),
                seq,
                reason = %guard_verdict.reason,
                "Turn refused"
            );
            let refusal = PromptTemplate::refusal(&guard_verdict);
            builder.refused(guard_verdict, refusal)
        }
    }

    async fn answer(
        &self,
        session: &Session,
        builder: &mut TurnBuilder,
        view: &mut TurnAlertView,
        cancel: &CancellationToken,
    ) -> Outcome {
        let tools = self.invoker.definitions();
        let mut context = self.initial_context(session, builder.user_text(), view);
        let mut tool_rounds = 0usize;

        loop {
            let served = tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled_outcome(),
                served = self.models.generate(&context, &tools) => served,
            };
            let served = match served {
                Ok(served) => served,
                Err(failure) => {
                    warn!(session = %builder.session_id(), seq = builder.sequence(), "{}", failure);
                    return fallback_outcome(VerdictKind::ProviderUnavailable, failure.to_string());
                }
            };
            builder.note_provider(served.provider.clone());

            let draft = match served.reply {
                ModelReply::ToolCalls(calls) if !calls.is_empty() => {
                    tool_rounds += 1;
                    if tool_rounds > self.params.max_tool_turns {
                        warn!(
                            session = %builder.session_id(),
                            seq = builder.sequence(),
                            "Tool loop exceeded max_tool_turns ({})",
                            self.params.max_tool_turns
                        );
                        return fallback_outcome(
                            VerdictKind::ToolLoopExceeded,
                            format!("more than {} tool rounds", self.params.max_tool_turns),
                        );
                    }
                    debug!(
                        "Tool round {}/{}: {} call(s)",
                        tool_rounds,
                        self.params.max_tool_turns,
                        calls.len()
                    );

                    let records = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return cancelled_outcome(),
                        records = self.invoker.invoke_all(&calls) => records,
                    };
                    context.push(Message::assistant_tool_calls(calls));
                    for record in records {
                        self.absorb(&mut context, builder, view, record);
                    }
                    if self.ensure_route(&mut context, builder, view, cancel).await.is_err() {
                        return cancelled_outcome();
                    }
                    continue;
                }
                ModelReply::ToolCalls(_) => String::new(),
                ModelReply::Draft(text) => text,
            };

            if self.ensure_route(&mut context, builder, view, cancel).await.is_err() {
                return cancelled_outcome();
            }

            let verdict = self.validator.validate(
                &draft,
                &ValidationContext {
                    records: builder.records(),
                    alert_level: view.snapshot().map(|s| s.level()),
                },
            );
            if verdict.is_pass() {
                return (release(draft, builder.records()), verdict);
            }

            info!(
                session = %builder.session_id(),
                seq = builder.sequence(),
                verdict = %verdict.kind,
                "Draft rejected: {}",
                verdict.reason
            );
            if builder.regenerations() >= self.params.max_regenerations {
                let text = PromptTemplate::fallback(verdict.kind).to_string();
                return (text, verdict);
            }

            builder.note_regeneration();
            let guidance = PromptTemplate::corrective_guidance(
                &verdict,
                safe_destination(builder.records()).as_deref(),
            );
            context.push(Message::assistant(draft));
            context.push(Message::user(guidance));
        }
    }

    fn initial_context(
        &self,
        session: &Session,
        user_text: &str,
        view: &TurnAlertView,
    ) -> ConversationContext {
        let mut system = PromptTemplate::assistant_system(self.invoker.tool_spec());
        if let Some(at) = view.location() {
            system.push_str(&format!(
                "\n\nThe conversation is about the location at latitude {:.4}, longitude {:.4}.",
                at.latitude, at.longitude
            ));
        }
        if let Some(snapshot) = view.snapshot() {
            system.push_str(&format!(
                " Its last known alert level is {}.",
                snapshot.level()
            ));
        }

        let mut context = ConversationContext::with_system(system);
        let answered: Vec<&Turn> = session
            .turns()
            .iter()
            .filter(|t| t.final_response().is_some())
            .collect();
        let skip = answered.len().saturating_sub(self.params.history_turns);
        for turn in answered.into_iter().skip(skip) {
            context.push(Message::user(turn.user_text()));
            context.push(Message::assistant(turn.reply_text()));
        }
        context.push(Message::user(user_text));
        context
    }

    /// Record a tool result, feed it back to the model and track location/alerts.
    fn absorb(
        &self,
        context: &mut ConversationContext,
        builder: &mut TurnBuilder,
        view: &mut TurnAlertView,
        record: ToolCallRecord,
    ) {
        context.push(Message::tool_result(
            record.call_id.clone(),
            record.tool_name.clone(),
            record.model_content(),
        ));

        if record.is_success() {
            match record.tool_name.as_str() {
                catalog::GEOCODE => {
                    if let Some(at) = record.output().and_then(geocoded) {
                        view.focus(&self.escalator, at);
                    }
                }
                catalog::WEATHER_LOOKUP => {
                    if let Some((at, transition)) = self.escalator.observe(&record) {
                        let conditions = record
                            .output()
                            .and_then(|o| o.get("conditions"))
                            .and_then(|c| c.as_str())
                            .unwrap_or_default();
                        view.record_own(at, &transition, conditions);
                    }
                }
                _ => {}
            }
        }
        builder.push_record(record);
    }

    /// Under an active hazard, make sure the turn has a route suggestion.
    ///
    /// The call is issued once per turn, when no successful route exists.
    async fn ensure_route(
        &self,
        context: &mut ConversationContext,
        builder: &mut TurnBuilder,
        view: &TurnAlertView,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        if !view.requires_route() {
            return Ok(());
        }
        let routed = builder
            .records()
            .iter()
            .any(|r| r.tool_name == catalog::ROUTE_SUGGESTION && (r.is_success() || r.injected));
        if routed {
            return Ok(());
        }
        let Some(at) = view.location() else {
            return Ok(());
        };

        info!(
            session = %builder.session_id(),
            seq = builder.sequence(),
            "Active hazard in effect; requesting evacuation route"
        );
        let call: ToolCall = catalog::route_call(
            format!("route-{}", builder.sequence()),
            at,
            view.level(),
            view.conditions(),
        );
        let record = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Cancelled),
            record = self.invoker.invoke(&call) => record.mark_injected(),
        };
        context.push(Message::assistant_tool_calls(vec![call]));
        context.push(Message::tool_result(
            record.call_id.clone(),
            record.tool_name.clone(),
            record.model_content(),
        ));
        builder.push_record(record);
        Ok(())
    }
}

fn geocoded(output: &serde_json::Value) -> Option<Coordinates> {
    let lat = output.get("latitude")?.as_f64()?;
    let lon = output.get("longitude")?.as_f64()?;
    Coordinates::new(lat, lon).ok()
}

/// Validated draft, with a note when some live data was missing.
fn release(draft: String, records: &[ToolCallRecord]) -> String {
    let partial = records
        .iter()
        .any(|r| r.error_kind() == Some(ToolErrorKind::ToolUnavailable));
    if partial {
        format!("{}\n\n{}", draft.trim_end(), PromptTemplate::partial_data_note())
    } else {
        draft
    }
}

fn fallback_outcome(kind: VerdictKind, reason: String) -> Outcome {
    (
        PromptTemplate::fallback(kind).to_string(),
        ValidationVerdict::marker(kind, reason),
    )
}

fn cancelled_outcome() -> Outcome {
    fallback_outcome(VerdictKind::Cancelled, "turn cancelled".to_string())
}
