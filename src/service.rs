//! The lookup pipeline shared by the JSON and HTML front ends

use std::sync::Arc;

use anyhow::Result as AnyResult;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::geocoding::{Geocoder, NominatimGeocoder};
use crate::location_resolver::LocationResolver;
use crate::models::{LocationQuery, WeatherResult};
use crate::weather::{OpenWeatherMapClient, ResponseNormalizer, WeatherFetcher};

/// Resolves a query, fetches its weather and normalizes the answer
pub struct WeatherService {
    resolver: LocationResolver,
    fetcher: Arc<dyn WeatherFetcher>,
    normalizer: ResponseNormalizer,
}

impl WeatherService {
    #[must_use]
    pub fn new(
        resolver: LocationResolver,
        fetcher: Arc<dyn WeatherFetcher>,
        normalizer: ResponseNormalizer,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            normalizer,
        }
    }

    /// Wire up the production clients described by `config`
    pub fn from_config(config: &AppConfig) -> AnyResult<Self> {
        let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimGeocoder::new(&config.geocoding)?);
        let fetcher: Arc<dyn WeatherFetcher> = Arc::new(OpenWeatherMapClient::new(&config.weather)?);

        Ok(Self::new(
            LocationResolver::new(geocoder, config.resolution.max_mismatch_km),
            fetcher,
            ResponseNormalizer::new(&config.weather.icon_base_url),
        ))
    }

    /// Run one lookup end to end
    #[instrument(skip(self))]
    pub async fn lookup(&self, query: &LocationQuery) -> crate::Result<WeatherResult> {
        let coordinate = self.resolver.resolve(query).await?;
        let payloads = self.fetcher.fetch(coordinate).await;
        let result = self
            .normalizer
            .normalize(payloads, query.display_label(&coordinate))?;

        info!(
            "Weather for '{}': {:.1}°C, {} forecast steps",
            result.location,
            result.current.temperature,
            result.forecast.len()
        );
        Ok(result)
    }
}
