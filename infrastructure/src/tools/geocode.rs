//! Place-name resolution through the Google Geocoding API.

use super::http::{client, send_json};
use async_trait::async_trait;
use haven_domain::tool::{ProviderError, ToolCall, ToolDefinition, ToolError, ToolProvider, catalog};
use serde_json::{Value, json};
use std::time::Duration;

pub struct GoogleGeocodeProvider {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl GoogleGeocodeProvider {
    pub fn new(
        url: &str,
        api_key: Option<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http: client(user_agent, timeout)?,
            url: url.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }
}

#[async_trait]
impl ToolProvider for GoogleGeocodeProvider {
    fn id(&self) -> &str {
        "google-geocoding"
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        vec![catalog::geocode_definition()]
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let place = call
            .require_string("placeName")
            .map_err(ToolError::invalid_arguments)?;
        if place.trim().is_empty() {
            return Err(ToolError::invalid_arguments("placeName is empty"));
        }
        let Some(key) = &self.api_key else {
            return Err(ToolError::unavailable("geocoding API key is not configured"));
        };

        let body = send_json(
            self.http
                .get(&self.url)
                .query(&[("address", place), ("key", key.as_str())]),
        )
        .await?;
        parse_geocode(place, &body)
    }
}

/// Map a Geocoding API response to `{latitude, longitude, formattedAddress}`.
pub fn parse_geocode(place: &str, body: &Value) -> Result<Value, ToolError> {
    match body["status"].as_str().unwrap_or_default() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(ToolError::not_found(place)),
        "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" => {
            return Err(ToolError::unavailable(format!(
                "geocoder status {}",
                body["status"]
            )));
        }
        other => {
            let detail = body["error_message"].as_str().unwrap_or_default();
            return Err(ToolError::upstream(format!(
                "geocoder status {}: {}",
                other, detail
            )));
        }
    }

    let first = &body["results"][0];
    let location = &first["geometry"]["location"];
    match (location["lat"].as_f64(), location["lng"].as_f64()) {
        (Some(lat), Some(lng)) => Ok(json!({
            "latitude": lat,
            "longitude": lng,
            "formattedAddress": first["formatted_address"].as_str().unwrap_or(place),
        })),
        _ => Err(ToolError::upstream("geocoder result has no location")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_domain::ToolErrorKind;

    #[test]
    fn test_ok_response() {
        let body = json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Miami, FL, USA",
                "geometry": {"location": {"lat": 25.7617, "lng": -80.1918}}
            }]
        });
        let out = parse_geocode("Miami", &body).unwrap();
        assert_eq!(out["latitude"], 25.7617);
        assert_eq!(out["longitude"], -80.1918);
        assert_eq!(out["formattedAddress"], "Miami, FL, USA");
    }

    #[test]
    fn test_status_kinds() {
        let zero = parse_geocode("Atlantis", &json!({"status": "ZERO_RESULTS", "results": []}));
        let zero = zero.unwrap_err();
        assert_eq!(zero.kind, ToolErrorKind::UpstreamError);
        assert!(zero.message.contains("Atlantis"));

        let limit = parse_geocode("Miami", &json!({"status": "OVER_QUERY_LIMIT"})).unwrap_err();
        assert_eq!(limit.kind, ToolErrorKind::ToolUnavailable);

        let denied = parse_geocode(
            "Miami",
            &json!({"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}),
        )
        .unwrap_err();
        assert_eq!(denied.kind, ToolErrorKind::UpstreamError);
        assert!(denied.message.contains("invalid"));
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let provider = GoogleGeocodeProvider::new(
            "http://127.0.0.1:9/geocode",
            Some(String::new()),
            "haven-test",
            Duration::from_secs(1),
        )
        .unwrap();
        let call = ToolCall::new("c1", catalog::GEOCODE).with_arg("placeName", "Miami, FL");
        let err = provider.execute(&call).await.unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::ToolUnavailable);

        let err = provider
            .execute(&ToolCall::new("c2", catalog::GEOCODE))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
    }
}
