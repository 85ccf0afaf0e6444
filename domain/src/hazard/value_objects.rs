//! Typed views over weather, geocoding and routing results.
//!
//! Tool results travel through the system as JSON records (that is what the
//! model sees and what the audit log stores). These types give the
//! orchestrator and the validator a typed view of the same records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::DomainError;

/// Severity of hazard alerts at a location.
///
/// Ordered: `None < Advisory < ActiveHazard`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AlertLevel {
    #[default]
    None,
    Advisory,
    ActiveHazard,
}

impl AlertLevel {
    pub fn as_str(&self) -> &str {
        match self {
            AlertLevel::None => "none",
            AlertLevel::Advisory => "advisory",
            AlertLevel::ActiveHazard => "active-hazard",
        }
    }

    pub fn requires_route(&self) -> bool {
        matches!(self, AlertLevel::ActiveHazard)
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AlertLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "none" => Ok(AlertLevel::None),
            "advisory" => Ok(AlertLevel::Advisory),
            "active-hazard" => Ok(AlertLevel::ActiveHazard),
            other => Err(DomainError::InvalidAlertLevel(other.to_string())),
        }
    }
}

/// A point on the earth's surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn key(&self) -> LocationKey {
        LocationKey::from(*self)
    }
}

/// Identifier of a location in the alert store.
///
/// Coordinates are rounded to two decimals (about 1 km), so lookups for the
/// same town share one alert state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationKey(String);

impl LocationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Coordinates> for LocationKey {
    fn from(c: Coordinates) -> Self {
        // Adding 0.0 folds -0.00 into 0.00.
        let lat = (c.latitude * 100.0).round() / 100.0 + 0.0;
        let lon = (c.longitude * 100.0).round() / 100.0 + 0.0;
        Self(format!("{:.2},{:.2}", lat, lon))
    }
}

impl std::fmt::Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a weather/alert lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub temperature: f64,
    pub conditions: String,
    pub alert_severity: AlertLevel,
    pub source_timestamp: DateTime<Utc>,
}

impl WeatherReport {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, DomainError> {
        serde_json::from_value(value.clone())
            .map_err(|e| DomainError::InvalidToolOutput(format!("weather report: {}", e)))
    }
}

/// Result of a route suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub ordered_waypoints: Vec<String>,
    pub estimated_safe_destination: String,
}

impl RoutePlan {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, DomainError> {
        serde_json::from_value(value.clone())
            .map_err(|e| DomainError::InvalidToolOutput(format!("route plan: {}", e)))
    }
}
