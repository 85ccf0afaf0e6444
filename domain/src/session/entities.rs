//! Session entity

use chrono::{DateTime, Utc};

use super::id::SessionId;
use super::turn::Turn;
use crate::hazard::{AlertSnapshot, Coordinates};

/// A conversation with one user (Entity)
///
/// Holds the ordered, immutable turns plus the conversation's current
/// location and the alert state last observed for it.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
    turns: Vec<Turn>,
    last_location: Option<Coordinates>,
    alert: Option<AlertSnapshot>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            turns: Vec::new(),
            last_location: None,
            alert: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Sequence number for the next turn (1-based, monotonic).
    pub fn next_sequence(&self) -> u64 {
        self.turns.last().map_or(1, |t| t.sequence() + 1)
    }

    /// Append a finished turn. Out-of-order sequences are rejected.
    pub fn push_turn(&mut self, turn: Turn) -> bool {
        if turn.sequence() != self.next_sequence() {
            return false;
        }
        if let Some(snapshot) = turn.alert() {
            self.alert = Some(snapshot.clone());
        }
        self.turns.push(turn);
        true
    }

    pub fn last_location(&self) -> Option<Coordinates> {
        self.last_location
    }

    pub fn set_location(&mut self, at: Coordinates) {
        self.last_location = Some(at);
    }

    /// Alert state last observed by this session.
    pub fn alert(&self) -> Option<&AlertSnapshot> {
        self.alert.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::{GuardVerdict, Topic};
    use crate::session::turn::TurnBuilder;

    fn refused(session: &Session, seq: u64) -> Turn {
        TurnBuilder::new(session.id().clone(), seq, "joke")
            .refused(GuardVerdict::out_of_scope(Topic::Unrelated), "no")
    }

    #[test]
    fn test_sequences_are_monotonic() {
        let mut session = Session::new(SessionId::new("s"));
        assert_eq!(session.next_sequence(), 1);

        let first = refused(&session, 1);
        assert!(session.push_turn(first));
        assert_eq!(session.next_sequence(), 2);

        let stale = refused(&session, 1);
        assert!(!session.push_turn(stale));
        assert_eq!(session.turns().len(), 1);
    }

    #[test]
    fn test_location_is_remembered() {
        let mut session = Session::new(SessionId::generate());
        assert!(session.last_location().is_none());
        let miami = Coordinates::new(25.76, -80.19).unwrap();
        session.set_location(miami);
        assert_eq!(session.last_location(), Some(miami));
    }
}
