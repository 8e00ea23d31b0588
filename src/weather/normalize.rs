//! Mapping of OpenWeatherMap payloads onto [`WeatherResult`]

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::WeatherPayloads;
use crate::models::{CurrentConditions, ForecastEntry, WeatherResult};
use crate::{LookupError, Result};

const MALFORMED_PAYLOAD: &str = "Malformed weather data from provider";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Response schemas for the OpenWeatherMap 2.5 API
mod schema {
    use super::*;

    /// Fields every response carries, success or not
    #[derive(Debug, Deserialize)]
    pub struct StatusEnvelope {
        #[serde(default)]
        pub cod: Option<Value>,
        #[serde(default)]
        pub message: Option<Value>,
    }

    /// Body of `/weather`
    #[derive(Debug, Deserialize)]
    pub struct CurrentPayload {
        pub main: MainBlock,
        pub weather: Vec<ConditionBlock>,
    }

    /// Body of `/forecast`
    #[derive(Debug, Deserialize)]
    pub struct ForecastPayload {
        #[serde(default)]
        pub list: Vec<ForecastItem>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        /// Unix timestamp, UTC
        #[serde(default)]
        pub dt: Option<i64>,
        pub dt_txt: Option<String>,
        pub main: MainBlock,
        pub weather: Vec<ConditionBlock>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainBlock {
        pub temp: f64,
        #[serde(default)]
        pub humidity: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ConditionBlock {
        pub description: String,
        pub icon: String,
    }
}

use schema::{ConditionBlock, CurrentPayload, ForecastItem, ForecastPayload, StatusEnvelope};

/// How an endpoint spells "success" in its `cod` field.
///
/// `/weather` uses the number 200 while `/forecast` uses the string "200".
#[derive(Debug, Clone, Copy)]
enum SuccessCode {
    Numeric,
    Text,
}

impl SuccessCode {
    fn matches(self, cod: &Value) -> bool {
        match self {
            SuccessCode::Numeric => cod.as_i64() == Some(200),
            SuccessCode::Text => cod.as_str() == Some("200"),
        }
    }
}

/// Fail with the provider's message unless the payload reports success
fn check_status(payload: &Value, success: SuccessCode, default_message: &str) -> Result<()> {
    let envelope = StatusEnvelope::deserialize(payload).ok();
    let cod = envelope.as_ref().and_then(|e| e.cod.as_ref());

    if cod.is_some_and(|cod| success.matches(cod)) {
        return Ok(());
    }

    let message = envelope
        .as_ref()
        .and_then(|e| e.message.as_ref())
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(default_message);

    warn!("Weather provider reported cod={:?}: {}", cod, message);
    Err(LookupError::provider(message))
}

fn decode<T: DeserializeOwned>(payload: &Value) -> Result<T> {
    T::deserialize(payload).map_err(|e| {
        warn!("Weather payload does not match schema: {}", e);
        LookupError::provider(MALFORMED_PAYLOAD)
    })
}

/// Start of a forecast step from `dt`, or from `dt_txt` (UTC) when `dt` is absent
fn forecast_timestamp(item: &ForecastItem) -> Option<DateTime<Utc>> {
    match (item.dt, item.dt_txt.as_deref()) {
        (Some(dt), _) => DateTime::from_timestamp(dt, 0),
        (None, Some(text)) => NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
            .ok()
            .map(|naive| naive.and_utc()),
        (None, None) => None,
    }
}

/// Turns provider payloads into the service's output shape
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    icon_base_url: String,
}

impl ResponseNormalizer {
    #[must_use]
    pub fn new(icon_base_url: &str) -> Self {
        Self {
            icon_base_url: icon_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the result for `label`, or the error the payloads describe
    pub fn normalize(
        &self,
        payloads: Option<WeatherPayloads>,
        label: String,
    ) -> Result<WeatherResult> {
        let Some(payloads) = payloads else {
            return Err(LookupError::WeatherServiceUnavailable);
        };

        check_status(&payloads.current, SuccessCode::Numeric, "Weather API error")?;
        check_status(&payloads.forecast, SuccessCode::Text, "Forecast API error")?;

        let current: CurrentPayload = decode(&payloads.current)?;
        let forecast: ForecastPayload = decode(&payloads.forecast)?;

        let condition = current.weather.first().ok_or_else(|| {
            warn!("Current weather payload has no conditions");
            LookupError::provider(MALFORMED_PAYLOAD)
        })?;

        let current = CurrentConditions {
            temperature: current.main.temp,
            humidity: current.main.humidity.unwrap_or_default(),
            description: condition.description.clone(),
            icon_url: self.icon_url(condition),
        };

        let forecast = forecast
            .list
            .iter()
            .map(|item| self.forecast_entry(item))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Normalized weather for '{}' with {} forecast steps",
            label,
            forecast.len()
        );

        Ok(WeatherResult {
            location: label,
            current,
            forecast,
        })
    }

    fn forecast_entry(&self, item: &ForecastItem) -> Result<ForecastEntry> {
        let timestamp = forecast_timestamp(item).ok_or_else(|| {
            warn!(
                "Forecast step has no usable time: dt={:?}, dt_txt={:?}",
                item.dt, item.dt_txt
            );
            LookupError::provider(MALFORMED_PAYLOAD)
        })?;
        let condition = item
            .weather
            .first()
            .ok_or_else(|| LookupError::provider(MALFORMED_PAYLOAD))?;

        Ok(ForecastEntry {
            datetime: item
                .dt_txt
                .clone()
                .unwrap_or_else(|| timestamp.format(DATETIME_FORMAT).to_string()),
            timestamp,
            temperature: item.main.temp,
            description: condition.description.clone(),
            icon_url: self.icon_url(condition),
        })
    }

    fn icon_url(&self, condition: &ConditionBlock) -> String {
        format!("{}/{}@2x.png", self.icon_base_url, condition.icon)
    }
}
