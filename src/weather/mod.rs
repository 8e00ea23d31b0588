//! Weather retrieval and normalization
//!
//! Fetching and interpreting provider payloads are kept apart: the fetcher
//! only reports whether both bodies arrived, the normalizer decides whether
//! they describe weather or a provider error.

use async_trait::async_trait;
use serde_json::Value;

use crate::models::Coordinate;

pub mod normalize;
pub mod openweathermap;

pub use normalize::ResponseNormalizer;
pub use openweathermap::OpenWeatherMapClient;

/// Raw JSON bodies of the current-conditions and forecast endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayloads {
    pub current: Value,
    pub forecast: Value,
}

/// Retrieves current conditions and forecast for a coordinate.
///
/// Returns `None` unless both payloads were received.
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn fetch(&self, coordinate: Coordinate) -> Option<WeatherPayloads>;
}
