//! Weather and alert lookups against the National Weather Service API.
//!
//! One `weather_lookup` call makes three requests:
//!
//! 1. `GET /points/{lat},{lon}` resolves the forecast grid for the point.
//! 2. `GET {forecastHourly}` gives the current temperature and conditions.
//! 3. `GET /alerts/active?point={lat},{lon}` gives the active alerts.
//!
//! The most severe active alert decides `alertSeverity`.

use super::http::{client, send_json};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use haven_domain::tool::{ProviderError, ToolCall, ToolDefinition, ToolError, ToolProvider, catalog};
use haven_domain::{AlertLevel, Coordinates};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

pub struct NwsWeatherProvider {
    http: reqwest::Client,
    base_url: String,
}

impl NwsWeatherProvider {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: client(user_agent, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn lookup(&self, at: Coordinates) -> Result<Value, ToolError> {
        let point = format!("{:.4},{:.4}", at.latitude, at.longitude);

        let points = send_json(self.http.get(format!("{}/points/{}", self.base_url, point)))
            .await
            .map_err(outside_coverage)?;
        let forecast_url = forecast_url(&points)?;
        let forecast = send_json(self.http.get(forecast_url)).await?;
        let alerts = send_json(
            self.http
                .get(format!("{}/alerts/active", self.base_url))
                .query(&[("point", point.as_str())]),
        )
        .await?;

        let report = build_report(&forecast, &alerts, Utc::now())?;
        debug!(
            point = %point,
            severity = %report["alertSeverity"],
            "Weather lookup complete"
        );
        Ok(report)
    }
}

#[async_trait]
impl ToolProvider for NwsWeatherProvider {
    fn id(&self) -> &str {
        "nws"
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        vec![catalog::weather_lookup_definition()]
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        if call.tool_name != catalog::WEATHER_LOOKUP {
            return Err(ToolError::invalid_arguments(format!(
                "nws cannot run '{}'",
                call.tool_name
            )));
        }
        let at = catalog::call_coordinates(call)
            .ok_or_else(|| ToolError::invalid_arguments("latitude/longitude out of range"))?;
        self.lookup(at).await
    }
}

/// NWS answers 404 for points outside its coverage (non-US locations).
fn outside_coverage(e: ToolError) -> ToolError {
    if e.message.contains("404") {
        ToolError::upstream("location is outside National Weather Service coverage")
    } else {
        e
    }
}

fn forecast_url(points: &Value) -> Result<String, ToolError> {
    let props = &points["properties"];
    props["forecastHourly"]
        .as_str()
        .or_else(|| props["forecast"].as_str())
        .map(str::to_string)
        .ok_or_else(|| ToolError::upstream("points response has no forecast URL"))
}

/// NWS alert severity to alert level.
pub fn severity_level(severity: &str) -> AlertLevel {
    match severity {
        "Extreme" | "Severe" => AlertLevel::ActiveHazard,
        "Moderate" | "Minor" => AlertLevel::Advisory,
        _ => AlertLevel::None,
    }
}

/// Combine a forecast and an alerts response into a `weather_lookup` result.
pub fn build_report(forecast: &Value, alerts: &Value, now: DateTime<Utc>) -> Result<Value, ToolError> {
    let props = &forecast["properties"];
    let period = props["periods"]
        .as_array()
        .and_then(|p| p.first())
        .ok_or_else(|| ToolError::upstream("forecast has no periods"))?;
    let temperature = period["temperature"]
        .as_f64()
        .ok_or_else(|| ToolError::upstream("forecast period has no temperature"))?;
    let unit = period["temperatureUnit"].as_str().unwrap_or("F");
    let short = period["shortForecast"].as_str().unwrap_or_default();

    let worst = alerts["features"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|f| &f["properties"])
        .map(|p| {
            (
                severity_level(p["severity"].as_str().unwrap_or_default()),
                p["event"].as_str().unwrap_or_default(),
            )
        })
        .max_by_key(|(level, _)| *level);

    let (level, conditions) = match worst {
        Some((level, event)) if level != AlertLevel::None && !event.is_empty() => {
            (level, format!("{}; {}", short, event))
        }
        Some((level, _)) => (level, short.to_string()),
        None => (AlertLevel::None, short.to_string()),
    };

    let issued = ["updateTime", "generatedAt"]
        .iter()
        .find_map(|k| props[*k].as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(now);

    Ok(json!({
        "temperature": temperature,
        "temperatureUnit": unit,
        "conditions": conditions,
        "alertSeverity": level.to_string(),
        "sourceTimestamp": issued.to_rfc3339(),
    }))
}
