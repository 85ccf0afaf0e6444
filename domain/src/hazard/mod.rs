//! Hazard domain: locations, weather reports, route plans and the
//! per-location alert state machine.

pub mod alert;
pub mod value_objects;

pub use alert::{AlertSnapshot, AlertState, AlertTransition, transition};
pub use value_objects::{AlertLevel, Coordinates, LocationKey, RoutePlan, WeatherReport};
