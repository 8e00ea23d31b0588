//! OpenWeatherMap client for the current weather and 5 day / 3 hour forecast endpoints

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{WeatherFetcher, WeatherPayloads};
use crate::config::WeatherConfig;
use crate::models::Coordinate;

/// Weather API client for OpenWeatherMap
pub struct OpenWeatherMapClient {
    /// HTTP client
    client: Client,
    base_url: String,
    api_key: String,
    /// Budget shared by both requests of one fetch
    timeout: Duration,
}

impl OpenWeatherMapClient {
    /// Create a new weather API client
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weather-lookup/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create weather HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    fn endpoint_url(&self, endpoint: &str, coordinate: &Coordinate) -> String {
        format!(
            "{}/{}?lat={}&lon={}&units=metric&appid={}",
            self.base_url,
            endpoint,
            coordinate.latitude,
            coordinate.longitude,
            urlencoding::encode(&self.api_key)
        )
    }

    /// GET an endpoint and read its body as JSON, whatever the HTTP status.
    ///
    /// OpenWeatherMap reports its own errors (bad key, unknown place) as JSON
    /// bodies, so only transport and decoding failures yield `None`.
    async fn get_json(&self, endpoint: &str, coordinate: &Coordinate) -> Option<Value> {
        let start_time = Instant::now();
        let response = match self
            .client
            .get(self.endpoint_url(endpoint, coordinate))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // reqwest errors carry the URL, which carries the key
                warn!("Request to '{}' endpoint failed: {}", endpoint, e.without_url());
                return None;
            }
        };

        let status = response.status();
        let body = match response.json::<Value>().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    "Unreadable '{}' response (HTTP {}): {}",
                    endpoint,
                    status,
                    e.without_url()
                );
                return None;
            }
        };

        let elapsed = start_time.elapsed();
        debug!(
            "'{}' endpoint answered HTTP {} in {:.3}s",
            endpoint,
            status,
            elapsed.as_secs_f64()
        );
        if elapsed.as_secs() > 5 {
            warn!(
                "Slow '{}' response detected: {:.3}s",
                endpoint,
                elapsed.as_secs_f64()
            );
        }

        Some(body)
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherMapClient {
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn fetch(&self, coordinate: Coordinate) -> Option<WeatherPayloads> {
        info!(
            "Getting weather for coordinates: {:.4}, {:.4}",
            coordinate.latitude, coordinate.longitude
        );

        let both = async {
            tokio::join!(
                self.get_json("weather", &coordinate),
                self.get_json("forecast", &coordinate)
            )
        };

        match tokio::time::timeout(self.timeout, both).await {
            Ok((Some(current), Some(forecast))) => Some(WeatherPayloads { current, forecast }),
            Ok(_) => None,
            Err(_) => {
                warn!(
                    "Weather requests exceeded the {:.1}s budget",
                    self.timeout.as_secs_f64()
                );
                None
            }
        }
    }
}
