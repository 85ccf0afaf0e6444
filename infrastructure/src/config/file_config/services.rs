//! Tool backend endpoints (`[services]`)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServicesConfig {
    /// National Weather Service API root
    pub weather_base_url: String,
    /// NWS requires an identifying User-Agent
    pub user_agent: String,
    /// Google Geocoding API endpoint
    pub geocode_url: String,
    pub geocode_api_key_env: String,
    /// Routing service endpoint; route suggestions are unavailable when unset
    pub route_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for FileServicesConfig {
    fn default() -> Self {
        Self {
            weather_base_url: "https://api.weather.gov".to_string(),
            user_agent: concat!("haven/", env!("CARGO_PKG_VERSION"), " (preparedness assistant)")
                .to_string(),
            geocode_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            geocode_api_key_env: "GOOGLE_MAP_KEY".to_string(),
            route_url: None,
            request_timeout_secs: 10,
        }
    }
}
