//! The three capabilities the assistant can call, with their schemas.

use super::entities::{ParamType, ToolCall, ToolDefinition, ToolParameter};
use crate::hazard::{AlertLevel, Coordinates};

pub const GEOCODE: &str = "geocode";
pub const WEATHER_LOOKUP: &str = "weather_lookup";
pub const ROUTE_SUGGESTION: &str = "route_suggestion";

pub fn geocode_definition() -> ToolDefinition {
    ToolDefinition::new(
        GEOCODE,
        "Resolve a place name or street address to latitude and longitude.",
    )
    .with_parameter(ToolParameter::new(
        "placeName",
        "Place name or address, e.g. \"Miami, FL\"",
        true,
    ))
    .with_output(ToolParameter::new("latitude", "Latitude in degrees", true).with_type(ParamType::Number))
    .with_output(
        ToolParameter::new("longitude", "Longitude in degrees", true).with_type(ParamType::Number),
    )
}

pub fn weather_lookup_definition() -> ToolDefinition {
    ToolDefinition::new(
        WEATHER_LOOKUP,
        "Current weather and the most severe active hazard alert at a coordinate.",
    )
    .with_parameter(ToolParameter::new("latitude", "Latitude in degrees", true).with_type(ParamType::Number))
    .with_parameter(
        ToolParameter::new("longitude", "Longitude in degrees", true).with_type(ParamType::Number),
    )
    .with_output(
        ToolParameter::new("temperature", "Current temperature", true).with_type(ParamType::Number),
    )
    .with_output(ToolParameter::new("temperatureUnit", "F or C; F when absent", false))
    .with_output(ToolParameter::new("conditions", "Short forecast text", true))
    .with_output(ToolParameter::new(
        "alertSeverity",
        "One of none, advisory, active-hazard",
        true,
    ))
    .with_output(ToolParameter::new(
        "sourceTimestamp",
        "RFC 3339 time the data was issued",
        true,
    ))
}

pub fn route_suggestion_definition() -> ToolDefinition {
    ToolDefinition::new(
        ROUTE_SUGGESTION,
        "Suggest an evacuation route away from a hazard, starting at a coordinate.",
    )
    .with_parameter(ToolParameter::new("latitude", "Start latitude", true).with_type(ParamType::Number))
    .with_parameter(ToolParameter::new("longitude", "Start longitude", true).with_type(ParamType::Number))
    .with_parameter(ToolParameter::new(
        "hazardContext",
        "Hazard being evacuated from, e.g. \"active-hazard: Hurricane Warning\"",
        false,
    ))
    .with_output(
        ToolParameter::new("orderedWaypoints", "Waypoints in travel order", true)
            .with_type(ParamType::Array),
    )
    .with_output(ToolParameter::new(
        "estimatedSafeDestination",
        "Destination outside the hazard area",
        true,
    ))
}

/// Weather lookup call for a coordinate.
pub fn weather_call(id: impl Into<String>, at: Coordinates) -> ToolCall {
    ToolCall::new(id, WEATHER_LOOKUP)
        .with_arg("latitude", at.latitude)
        .with_arg("longitude", at.longitude)
}

/// Route suggestion call for a coordinate under the given alert level.
pub fn route_call(
    id: impl Into<String>,
    at: Coordinates,
    level: AlertLevel,
    conditions: Option<&str>,
) -> ToolCall {
    let context = match conditions {
        Some(c) if !c.is_empty() => format!("{}: {}", level, c),
        _ => level.to_string(),
    };
    ToolCall::new(id, ROUTE_SUGGESTION)
        .with_arg("latitude", at.latitude)
        .with_arg("longitude", at.longitude)
        .with_arg("hazardContext", context)
}

/// Coordinates named by a call's `latitude`/`longitude` arguments.
pub fn call_coordinates(call: &ToolCall) -> Option<Coordinates> {
    let lat = call.get_f64("latitude")?;
    let lon = call.get_f64("longitude")?;
    Coordinates::new(lat, lon).ok()
}
