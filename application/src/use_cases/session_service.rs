//! Session API: start, submit, cancel and end conversations.
//!
//! Turns of one session are serialized by the session's own lock; different
//! sessions proceed in parallel. Every session owns a root
//! [`CancellationToken`]; each turn runs under a child of it so that
//! [`SessionService::cancel_turn`] aborts only the in-flight turn while
//! [`SessionService::end_session`] aborts everything.

use crate::use_cases::orchestrator::Orchestrator;
use haven_domain::{Session, SessionId, Turn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
}

struct SessionSlot {
    session: Mutex<Session>,
    root: CancellationToken,
    current: StdMutex<Option<CancellationToken>>,
}

impl SessionSlot {
    fn new(id: SessionId) -> Self {
        Self {
            session: Mutex::new(Session::new(id)),
            root: CancellationToken::new(),
            current: StdMutex::new(None),
        }
    }

    fn set_current(&self, token: Option<CancellationToken>) {
        if let Ok(mut current) = self.current.lock() {
            *current = token;
        }
    }
}

pub struct SessionService {
    orchestrator: Arc<Orchestrator>,
    sessions: RwLock<HashMap<SessionId, Arc<SessionSlot>>>,
}

impl SessionService {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn start_session(&self) -> SessionId {
        let id = SessionId::generate();
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(id.clone(), Arc::new(SessionSlot::new(id.clone())));
        }
        info!(session = %id, "Session started");
        id
    }

    /// Run one turn and return it. Waits for any earlier turn of the same
    /// session to finish first, and fails if the session ends meanwhile.
    pub async fn submit_turn(&self, id: &SessionId, text: &str) -> Result<Turn, SessionError> {
        let slot = self.slot(id)?;
        let mut session = slot.session.lock().await;
        // Ended while this turn was queued behind another one
        if slot.root.is_cancelled() {
            return Err(SessionError::NotFound(id.clone()));
        }

        let cancel = slot.root.child_token();
        slot.set_current(Some(cancel.clone()));
        let turn = self.orchestrator.run_turn(&mut session, text, &cancel).await;
        slot.set_current(None);

        Ok(turn)
    }

    /// Cancel the in-flight turn, if any. Returns whether a turn was running.
    pub fn cancel_turn(&self, id: &SessionId) -> Result<bool, SessionError> {
        let slot = self.slot(id)?;
        let current = slot.current.lock().ok().and_then(|c| c.clone());
        match current {
            Some(token) => {
                debug!(session = %id, "Cancelling in-flight turn");
                token.cancel();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop the session, cancelling any turn still running.
    ///
    /// Returns the session history once no turn holds it any more.
    pub async fn end_session(&self, id: &SessionId) -> Result<Session, SessionError> {
        let slot = self
            .sessions
            .write()
            .ok()
            .and_then(|mut sessions| sessions.remove(id))
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        slot.root.cancel();

        let session = slot.session.lock().await.clone();
        info!(session = %id, turns = session.turns().len(), "Session ended");
        Ok(session)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    fn slot(&self, id: &SessionId) -> Result<Arc<SessionSlot>, SessionError> {
        self.sessions
            .read()
            .ok()
            .and_then(|sessions| sessions.get(id).cloned())
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuardParams;
    use crate::test_support::*;
    use crate::use_cases::audit_logger::AuditLogger;
    use crate::use_cases::input_guard::InputGuard;
    use crate::use_cases::model_fallback::ModelRouter;
    use crate::use_cases::tool_invoker::ToolInvoker;
    use haven_domain::VerdictKind;
    use std::time::Duration;

    fn service(model: ScriptedModel) -> (SessionService, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::default());
        let orchestrator = Orchestrator::new(
            InputGuard::new(Arc::new(JokeAwareClassifier), GuardParams::default()),
            ModelRouter::new(Arc::new(model), Duration::from_secs(30)),
            Arc::new(ToolInvoker::new(Arc::new(FakeTools::miami()))),
            AuditLogger::spawn(sink.clone(), Arc::new(MemorySink::default())),
        );
        (SessionService::new(Arc::new(orchestrator)), sink)
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (svc, _) = service(ScriptedModel::new(
            "primary",
            vec![draft("Keep water and medication in your kit.")],
        ));
        let id = svc.start_session();
        assert_eq!(svc.active_sessions(), 1);

        let turn = svc.submit_turn(&id, "What goes in a kit?").await.unwrap();
        assert_eq!(turn.sequence(), 1);
        assert!(turn.validation().unwrap().is_pass());

        let ended = svc.end_session(&id).await.unwrap();
        assert_eq!(ended.turns().len(), 1);
        assert_eq!(svc.active_sessions(), 0);
        assert_eq!(
            svc.submit_turn(&id, "again").await.unwrap_err(),
            SessionError::NotFound(id.clone())
        );
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let (svc, _) = service(ScriptedModel::new("primary", vec![]));
        let id = SessionId::new("missing");
        assert!(matches!(
            svc.cancel_turn(&id),
            Err(SessionError::NotFound(_))
        ));
        assert!(svc.end_session(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_cancel_without_turn_in_flight() {
        let (svc, _) = service(ScriptedModel::new("primary", vec![]));
        let id = svc.start_session();
        assert_eq!(svc.cancel_turn(&id), Ok(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_turn_is_recorded() {
        let (svc, sink) = service(
            ScriptedModel::new("primary", vec![draft("Stay safe and keep water ready.")])
                .with_delay(Duration::from_secs(10)),
        );
        let svc = Arc::new(svc);
        let id = svc.start_session();

        let running = {
            let svc = svc.clone();
            let id = id.clone();
            tokio::spawn(async move { svc.submit_turn(&id, "Weather in Miami?").await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(svc.cancel_turn(&id), Ok(true));

        let turn = running.await.unwrap().unwrap();
        assert_eq!(turn.validation().unwrap().kind, VerdictKind::Cancelled);

        // The session stays usable for the next turn
        let next = svc.submit_turn(&id, "How do I stay safe?").await.unwrap();
        assert_eq!(next.sequence(), 2);
        assert!(next.validation().unwrap().is_pass());

        svc.orchestrator().audit().flush().await;
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn test_turns_of_one_session_are_sequential() {
        let (svc, _) = service(ScriptedModel::new(
            "primary",
            vec![
                draft("Keep water in your kit."),
                draft("Keep a flashlight in your kit."),
            ],
        ));
        let svc = Arc::new(svc);
        let id = svc.start_session();

        let (a, b) = tokio::join!(
            svc.submit_turn(&id, "What goes in a kit?"),
            svc.submit_turn(&id, "Anything else for the kit?")
        );
        let mut seqs = vec![a.unwrap().sequence(), b.unwrap().sequence()];
        seqs.sort();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_turn_is_dropped_when_session_ends() {
        let (svc, sink) = service(
            ScriptedModel::new(
                "primary",
                vec![
                    draft("Keep water in your kit."),
                    draft("Keep a flashlight in your kit."),
                ],
            )
            .with_delay(Duration::from_secs(10)),
        );
        let svc = Arc::new(svc);
        let id = svc.start_session();

        let submit = |text: &'static str| {
            let svc = svc.clone();
            let id = id.clone();
            tokio::spawn(async move { svc.submit_turn(&id, text).await })
        };
        let running = submit("What goes in a kit?");
        tokio::time::sleep(Duration::from_secs(1)).await;
        let queued = submit("Anything else for the kit?");
        tokio::time::sleep(Duration::from_secs(1)).await;

        let ended = svc.end_session(&id).await.unwrap();
        assert_eq!(ended.turns().len(), 1);

        let first = running.await.unwrap().unwrap();
        assert_eq!(first.validation().unwrap().kind, VerdictKind::Cancelled);
        assert_eq!(
            queued.await.unwrap().unwrap_err(),
            SessionError::NotFound(id.clone())
        );

        svc.orchestrator().audit().flush().await;
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_run_in_parallel() {
        let (svc, sink) = service(
            ScriptedModel::new(
                "primary",
                vec![
                    draft("Keep water in your kit."),
                    draft("Keep a flashlight in your kit."),
                ],
            )
            .with_delay(Duration::from_secs(10)),
        );
        let a = svc.start_session();
        let b = svc.start_session();

        let started = tokio::time::Instant::now();
        let (first, second) = tokio::join!(
            svc.submit_turn(&a, "What goes in a kit?"),
            svc.submit_turn(&b, "What goes in a kit?")
        );
        assert!(started.elapsed() < Duration::from_secs(20));

        let first = first.unwrap();
        let second = second.unwrap();
        assert_eq!(first.session_id(), &a);
        assert_eq!(second.session_id(), &b);
        assert_eq!(first.sequence(), 1);
        assert_eq!(second.sequence(), 1);
        assert!(first.validation().unwrap().is_pass());
        assert!(second.validation().unwrap().is_pass());

        svc.orchestrator().audit().flush().await;
        assert_eq!(sink.len(), 2);
    }
}
