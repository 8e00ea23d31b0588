//! Forward geocoding via Nominatim (OpenStreetMap)
//!
//! Every failure mode collapses to `None`; the resolver decides what a
//! missing result means for the request.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::GeocodingConfig;
use crate::models::{Coordinate, CoordinateValue};

/// Resolves free-text place names to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, name: &str) -> Option<Coordinate>;
}

/// One search hit. Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: Option<CoordinateValue>,
    lon: Option<CoordinateValue>,
    display_name: Option<String>,
}

impl NominatimPlace {
    fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.as_ref()?.parse("latitude").ok()??;
        let lon = self.lon.as_ref()?.parse("longitude").ok()??;
        Coordinate::new(lat, lon).ok()
    }
}

/// Geocoder backed by the Nominatim search API
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Create a new geocoder from configuration
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .with_context(|| "Failed to create geocoding HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, name: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(name)
        )
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn resolve(&self, name: &str) -> Option<Coordinate> {
        let name = name.trim();
        if name.is_empty() {
            debug!("Empty location string, skipping geocoding");
            return None;
        }

        let start_time = Instant::now();
        let response = match self.client.get(self.search_url(name)).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Geocoding request for '{}' failed: {}", name, e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                "Geocoding for '{}' returned status {}",
                name,
                response.status()
            );
            return None;
        }

        let places: Vec<NominatimPlace> = match response.json().await {
            Ok(places) => places,
            Err(e) => {
                warn!("Failed to parse geocoding response for '{}': {}", name, e);
                return None;
            }
        };

        let elapsed = start_time.elapsed();
        if elapsed.as_secs() > 5 {
            warn!("Slow geocoding response: {:.3}s", elapsed.as_secs_f64());
        }

        let Some(first) = places.first() else {
            debug!("No geocoding results for '{}'", name);
            return None;
        };

        match first.coordinate() {
            Some(coordinate) => {
                debug!(
                    "Found '{}' at ({:.4}, {:.4}) in {:.3}s",
                    first.display_name.as_deref().unwrap_or(name),
                    coordinate.latitude,
                    coordinate.longitude,
                    elapsed.as_secs_f64()
                );
                Some(coordinate)
            }
            None => {
                debug!("Unusable coordinates in geocoding result for '{}'", name);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder_for(server: &MockServer) -> NominatimGeocoder {
        let config = GeocodingConfig {
            base_url: server.uri(),
            user_agent: "weather-lookup-tests/1.0".to_string(),
            timeout_seconds: 5,
        };
        NominatimGeocoder::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_first_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Paris"))
            .and(query_param("limit", "1"))
            .and(query_param("format", "json"))
            .and(header("user-agent", "weather-lookup-tests/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"lat": "48.8588897", "lon": "2.3200410", "display_name": "Paris, France"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let coordinate = geocoder_for(&server).resolve("Paris").await.unwrap();
        assert_eq!(coordinate.latitude, 48.8588897);
        assert_eq!(coordinate.longitude, 2.3200410);
    }

    #[tokio::test]
    async fn test_resolve_encodes_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "São Paulo & Co"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"lat": "-23.55", "lon": "-46.63"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert!(geocoder_for(&server).resolve(" São Paulo & Co ").await.is_some());
    }

    #[tokio::test]
    async fn test_blank_name_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        assert!(geocoder_for(&server).resolve("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(geocoder_for(&server).resolve("Atlantis").await.is_none());
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        assert!(geocoder_for(&server).resolve("Paris").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"lat": "north", "lon": "2.3"}])),
            )
            .mount(&server)
            .await;

        assert!(geocoder_for(&server).resolve("Paris").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"display_name": "Nowhere"}])),
            )
            .mount(&server)
            .await;

        assert!(geocoder_for(&server).resolve("Nowhere").await.is_none());
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        assert!(geocoder_for(&server).resolve("Paris").await.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let config = GeocodingConfig {
            // Nothing listens on the discard port
            base_url: "http://127.0.0.1:9".to_string(),
            user_agent: "weather-lookup-tests/1.0".to_string(),
            timeout_seconds: 2,
        };
        let geocoder = NominatimGeocoder::new(&config).unwrap();
        assert!(geocoder.resolve("Paris").await.is_none());
    }
}
