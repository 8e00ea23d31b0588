//! Normalized weather output returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions at the resolved location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Temperature in Celsius
    #[serde(rename = "temperature_c")]
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Human-readable description of weather conditions
    #[serde(rename = "weather")]
    pub description: String,
    /// Full URL of the condition icon
    pub icon_url: String,
}

/// One step of the 3-hourly forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastEntry {
    /// Provider's display datetime for this step
    pub datetime: String,
    /// Start of the forecast step
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius
    #[serde(rename = "temperature_c")]
    pub temperature: f64,
    #[serde(rename = "weather")]
    pub description: String,
    pub icon_url: String,
}

impl ForecastEntry {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }
}

/// Result of a successful lookup
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherResult {
    /// Display label for the location
    pub location: String,
    pub current: CurrentConditions,
    /// Forecast steps in provider order
    #[serde(rename = "5_day_forecast")]
    pub forecast: Vec<ForecastEntry>,
}

impl CurrentConditions {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    /// Format humidity with unit
    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{:.0}%", self.humidity)
    }
}
