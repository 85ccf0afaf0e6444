//! Evacuation route suggestions from an HTTP routing service.
//!
//! The service receives the tool arguments as a JSON body and answers with
//! `{orderedWaypoints, estimatedSafeDestination}`. Without a configured
//! endpoint every call fails as `tool-unavailable`.

use super::http::{client, send_json};
use async_trait::async_trait;
use haven_domain::RoutePlan;
use haven_domain::tool::{ProviderError, ToolCall, ToolDefinition, ToolError, ToolProvider, catalog};
use serde_json::{Value, json};
use std::time::Duration;

pub struct HttpRouteProvider {
    http: reqwest::Client,
    url: Option<String>,
}

impl HttpRouteProvider {
    pub fn new(url: Option<String>, user_agent: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: client(user_agent, timeout)?,
            url,
        })
    }
}

#[async_trait]
impl ToolProvider for HttpRouteProvider {
    fn id(&self) -> &str {
        "http-routing"
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        vec![catalog::route_suggestion_definition()]
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let at = catalog::call_coordinates(call)
            .ok_or_else(|| ToolError::invalid_arguments("latitude/longitude out of range"))?;
        let Some(url) = &self.url else {
            return Err(ToolError::unavailable("no routing service configured"));
        };

        let body = json!({
            "latitude": at.latitude,
            "longitude": at.longitude,
            "hazardContext": call.get_string("hazardContext").unwrap_or_default(),
        });
        let resp = send_json(self.http.post(url).json(&body)).await?;
        check_plan(resp)
    }
}

/// Reject answers that are not a usable route.
pub fn check_plan(resp: Value) -> Result<Value, ToolError> {
    let plan = RoutePlan::from_value(&resp).map_err(|e| ToolError::upstream(e.to_string()))?;
    if plan.ordered_waypoints.is_empty() {
        return Err(ToolError::upstream("routing service returned no waypoints"));
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_domain::{AlertLevel, Coordinates, ToolErrorKind};

    #[tokio::test]
    async fn test_unconfigured_endpoint_is_unavailable() {
        let provider = HttpRouteProvider::new(None, "haven-test", Duration::from_secs(1)).unwrap();
        let call = catalog::route_call(
            "route-1",
            Coordinates::new(25.76, -80.19).unwrap(),
            AlertLevel::ActiveHazard,
            Some("Hurricane Warning"),
        );
        let err = provider.execute(&call).await.unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::ToolUnavailable);
    }

    #[test]
    fn test_check_plan() {
        let ok = json!({
            "orderedWaypoints": ["I-95 N", "FL-836 W", "I-75 N"],
            "estimatedSafeDestination": "Orlando, FL"
        });
        assert!(check_plan(ok).is_ok());

        let empty = json!({"orderedWaypoints": [], "estimatedSafeDestination": "Orlando, FL"});
        assert_eq!(check_plan(empty).unwrap_err().kind, ToolErrorKind::UpstreamError);

        let malformed = json!({"route": "north"});
        assert_eq!(check_plan(malformed).unwrap_err().kind, ToolErrorKind::UpstreamError);
    }
}
