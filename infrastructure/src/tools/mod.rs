//! Tool backends
//!
//! Each capability the assistant may call is served by a [`ToolProvider`]
//! plugged into a [`ToolRegistry`]:
//!
//! | Tool | Provider | Service |
//! |------|----------|---------|
//! | `geocode` | [`GoogleGeocodeProvider`] | Google Geocoding API |
//! | `weather_lookup` | [`NwsWeatherProvider`] | National Weather Service |
//! | `route_suggestion` | [`HttpRouteProvider`] | configured routing service |
//!
//! [`ToolProvider`]: haven_domain::tool::ToolProvider

mod http;

pub mod geocode;
pub mod registry;
pub mod route;
pub mod weather;

pub use geocode::GoogleGeocodeProvider;
pub use registry::ToolRegistry;
pub use route::HttpRouteProvider;
pub use weather::NwsWeatherProvider;

use crate::config::FileServicesConfig;
use haven_domain::ToolSpec;
use haven_domain::tool::{ProviderError, catalog};
use std::time::Duration;

/// The three tools the assistant knows about, with their default policies.
pub fn catalog_spec() -> ToolSpec {
    ToolSpec::new()
        .register(catalog::geocode_definition())
        .register(catalog::weather_lookup_definition())
        .register(catalog::route_suggestion_definition())
}

/// Registry wired to the services in `[services]`, already discovered.
pub async fn build_registry(
    services: &FileServicesConfig,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<ToolRegistry, ProviderError> {
    let timeout = Duration::from_secs(services.request_timeout_secs);
    let agent = services.user_agent.as_str();

    let mut registry = ToolRegistry::new()
        .register(GoogleGeocodeProvider::new(
            &services.geocode_url,
            lookup(&services.geocode_api_key_env),
            agent,
            timeout,
        )?)
        .register(NwsWeatherProvider::new(&services.weather_base_url, agent, timeout)?)
        .register(HttpRouteProvider::new(services.route_url.clone(), agent, timeout)?);
    registry.discover().await;
    Ok(registry)
}
