//! `weather-lookup` - resolve a place to coordinates and report its weather
//!
//! This library provides location resolution (geocoding with coordinate
//! cross-validation), weather retrieval from OpenWeatherMap, normalization of
//! provider payloads, and the JSON/HTML web front ends serving them.

pub mod api;
pub mod config;
pub mod distance;
pub mod error;
pub mod geocoding;
pub mod html;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod service;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use crate::config::AppConfig;
pub use crate::error::LookupError;
pub use crate::geocoding::{Geocoder, NominatimGeocoder};
pub use crate::location_resolver::LocationResolver;
pub use crate::models::{Coordinate, LocationQuery, WeatherResult};
pub use crate::service::WeatherService;
pub use crate::weather::{
    OpenWeatherMapClient, ResponseNormalizer, WeatherFetcher, WeatherPayloads,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
