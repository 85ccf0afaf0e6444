//! Alert escalator use case.
//!
//! Owns the shared per-location [`AlertState`] store. The store is only
//! written from weather lookups: a turn's own lookups (through
//! [`AlertEscalator::observe`]) and the background refresher.
//!
//! Each turn reads through a [`TurnAlertView`], a snapshot captured the
//! first time the turn looks at a location. Only the turn's own lookups
//! move that snapshot; writes from other sessions or the refresher land
//! in the store but not in an in-flight turn.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use haven_domain::hazard::transition;
use haven_domain::tool::catalog;
use haven_domain::{
    AlertLevel, AlertSnapshot, AlertState, AlertTransition, Coordinates, LocationKey,
    ToolCallRecord, WeatherReport,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A tracked location and its current state.
#[derive(Debug, Clone)]
pub struct TrackedLocation {
    pub at: Coordinates,
    pub state: AlertState,
}

#[derive(Clone, Default)]
pub struct AlertEscalator {
    store: Arc<DashMap<LocationKey, TrackedLocation>>,
}

impl AlertEscalator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloned snapshot of a location's state.
    pub fn snapshot(&self, at: Coordinates) -> Option<AlertSnapshot> {
        let key = at.key();
        self.store.get(&key).map(|entry| AlertSnapshot {
            location: key.clone(),
            state: entry.state.clone(),
        })
    }

    /// Apply a successful lookup for a location.
    ///
    /// The write holds the key's shard lock, so concurrent writers for the
    /// same key are serialized.
    pub fn apply(&self, at: Coordinates, report: &WeatherReport, source: &str) -> AlertTransition {
        let key = at.key();
        let next = AlertState::from_report(report, source);

        let outcome = match self.store.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let t = transition(Some(&occupied.get().state), next);
                if !matches!(t, AlertTransition::Stale(_)) {
                    let tracked = occupied.get_mut();
                    tracked.at = at;
                    tracked.state = t.current().clone();
                }
                t
            }
            Entry::Vacant(vacant) => {
                vacant.insert(TrackedLocation {
                    at,
                    state: next.clone(),
                });
                AlertTransition::Initialized(next)
            }
        };

        match &outcome {
            AlertTransition::Changed { from, to } => {
                info!(location = %key, from = %from, to = %to.level, "Alert level changed")
            }
            AlertTransition::Stale(_) => {
                debug!(location = %key, "Discarded lookup older than stored alert state")
            }
            _ => debug!(location = %key, level = %outcome.current().level, "Alert state recorded"),
        }
        outcome
    }

    /// Feed a weather lookup record into the store.
    ///
    /// Returns `None` for other tools, failed lookups (state is retained)
    /// and malformed outputs.
    pub fn observe(&self, record: &ToolCallRecord) -> Option<(Coordinates, AlertTransition)> {
        if record.tool_name != catalog::WEATHER_LOOKUP {
            return None;
        }
        let output = record.output()?;
        let at = coordinates_of(record)?;
        match WeatherReport::from_value(output) {
            Ok(report) => {
                let source = format!("{}#{}", record.tool_name, record.call_id);
                Some((at, self.apply(at, &report, &source)))
            }
            Err(e) => {
                warn!("Ignoring weather record {}: {}", record.call_id, e);
                None
            }
        }
    }

    /// All tracked locations, for the refresher.
    pub fn tracked(&self) -> Vec<TrackedLocation> {
        self.store.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

fn coordinates_of(record: &ToolCallRecord) -> Option<Coordinates> {
    let lat = record.arguments.get("latitude")?.as_f64()?;
    let lon = record.arguments.get("longitude")?.as_f64()?;
    Coordinates::new(lat, lon).ok()
}

/// One turn's view of the alert state of its location.
#[derive(Debug, Clone, Default)]
pub struct TurnAlertView {
    location: Option<Coordinates>,
    snapshot: Option<AlertSnapshot>,
    conditions: Option<String>,
}

impl TurnAlertView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the view at a location, capturing its stored state once.
    pub fn focus(&mut self, escalator: &AlertEscalator, at: Coordinates) {
        if self.location.map(|l| l.key()) == Some(at.key()) {
            return;
        }
        self.location = Some(at);
        self.snapshot = escalator.snapshot(at);
        self.conditions = None;
    }

    /// Adopt the result of this turn's own lookup.
    pub fn record_own(&mut self, at: Coordinates, transition: &AlertTransition, conditions: &str) {
        self.location = Some(at);
        self.snapshot = Some(AlertSnapshot {
            location: at.key(),
            state: transition.current().clone(),
        });
        self.conditions = Some(conditions.to_string());
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }

    pub fn snapshot(&self) -> Option<&AlertSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn conditions(&self) -> Option<&str> {
        self.conditions.as_deref()
    }

    pub fn level(&self) -> AlertLevel {
        self.snapshot
            .as_ref()
            .map(|s| s.state.level)
            .unwrap_or_default()
    }

    pub fn requires_route(&self) -> bool {
        self.level().requires_route()
    }
}
