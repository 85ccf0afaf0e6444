//! Per-location alert state and its transition rule.
//!
//! ```text
//!            ┌──────────┐      ┌──────────┐      ┌───────────────┐
//!   start ─▶ │   none   │ ◀──▶ │ advisory │ ◀──▶ │ active-hazard │
//!            └──────────┘      └──────────┘      └───────────────┘
//!                 ▲                                      │
//!                 └──────────────────────────────────────┘
//! ```
//!
//! Every transition is driven by a weather/alert lookup: the new level is
//! the severity the latest successful lookup reported. A failed lookup
//! leaves the state untouched, and a lookup older than the stored one is
//! discarded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{AlertLevel, LocationKey, WeatherReport};

/// Current hazard classification for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertState {
    pub level: AlertLevel,
    /// Source timestamp of the lookup that produced this state
    pub updated_at: DateTime<Utc>,
    /// Which lookup produced it (tool name and call id)
    pub source: String,
}

impl AlertState {
    pub fn new(level: AlertLevel, updated_at: DateTime<Utc>, source: impl Into<String>) -> Self {
        Self {
            level,
            updated_at,
            source: source.into(),
        }
    }

    pub fn from_report(report: &WeatherReport, source: impl Into<String>) -> Self {
        Self::new(report.alert_severity, report.source_timestamp, source)
    }
}

/// Alert state of one location as seen by a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSnapshot {
    pub location: LocationKey,
    pub state: AlertState,
}

impl AlertSnapshot {
    pub fn level(&self) -> AlertLevel {
        self.state.level
    }
}

/// Outcome of applying a lookup to the stored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertTransition {
    /// First state recorded for this location
    Initialized(AlertState),
    /// Level changed
    Changed { from: AlertLevel, to: AlertState },
    /// Same level, refreshed timestamp/source
    Refreshed(AlertState),
    /// Lookup older than the stored state; nothing changed
    Stale(AlertState),
}

impl AlertTransition {
    /// The state in effect after the transition.
    pub fn current(&self) -> &AlertState {
        match self {
            AlertTransition::Initialized(s)
            | AlertTransition::Refreshed(s)
            | AlertTransition::Stale(s) => s,
            AlertTransition::Changed { to, .. } => to,
        }
    }

    pub fn is_escalation(&self) -> bool {
        match self {
            AlertTransition::Initialized(s) => s.level > AlertLevel::None,
            AlertTransition::Changed { from, to } => to.level > *from,
            _ => false,
        }
    }
}

/// Apply a successful lookup to the previously stored state (if any).
pub fn transition(previous: Option<&AlertState>, next: AlertState) -> AlertTransition {
    match previous {
        None => AlertTransition::Initialized(next),
        Some(prev) if next.updated_at < prev.updated_at => AlertTransition::Stale(prev.clone()),
        Some(prev) if prev.level != next.level => AlertTransition::Changed {
            from: prev.level,
            to: next,
        },
        Some(_) => AlertTransition::Refreshed(next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, level: AlertLevel) -> AlertState {
        AlertState::new(
            level,
            Utc.with_ymd_and_hms(2026, 10, 15, hour, 0, 0).unwrap(),
            format!("weather_lookup#{}", hour),
        )
    }

    #[test]
    fn test_first_lookup_initializes() {
        let t = transition(None, at(9, AlertLevel::Advisory));
        assert!(matches!(t, AlertTransition::Initialized(_)));
        assert!(t.is_escalation());
        assert_eq!(t.current().level, AlertLevel::Advisory);
    }

    #[test]
    fn test_escalation_and_deescalation() {
        let prev = at(9, AlertLevel::Advisory);
        let up = transition(Some(&prev), at(10, AlertLevel::ActiveHazard));
        assert!(up.is_escalation());
        assert_eq!(up.current().level, AlertLevel::ActiveHazard);

        let down = transition(Some(up.current()), at(11, AlertLevel::None));
        assert!(!down.is_escalation());
        assert_eq!(down.current().level, AlertLevel::None);
    }

    #[test]
    fn test_stale_lookup_is_discarded() {
        let prev = at(10, AlertLevel::ActiveHazard);
        let t = transition(Some(&prev), at(9, AlertLevel::None));
        assert!(matches!(t, AlertTransition::Stale(_)));
        assert_eq!(t.current(), &prev);
    }

    #[test]
    fn test_same_level_refreshes_source() {
        let prev = at(9, AlertLevel::Advisory);
        let t = transition(Some(&prev), at(10, AlertLevel::Advisory));
        assert!(matches!(t, AlertTransition::Refreshed(_)));
        assert_eq!(t.current().source, "weather_lookup#10");
    }
}
