//! Location models: coordinates and the caller's lookup query

use serde::{Deserialize, Serialize};

use crate::{LookupError, Result};

/// A validated latitude/longitude pair
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LookupError::invalid_coordinates(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LookupError::invalid_coordinates(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A single latitude or longitude as it arrives from a client or provider.
///
/// JSON clients send numbers, HTML forms and Nominatim send strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    /// Parse into a finite number. Blank text counts as absent.
    pub fn parse(&self, field: &str) -> Result<Option<f64>> {
        let value = match self {
            CoordinateValue::Number(value) => *value,
            CoordinateValue::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                text.parse::<f64>().map_err(|_| {
                    LookupError::invalid_coordinates(format!("Invalid {field}: {text}"))
                })?
            }
        };

        if !value.is_finite() {
            return Err(LookupError::invalid_coordinates(format!(
                "Invalid {field}: {value}"
            )));
        }
        Ok(Some(value))
    }
}

impl From<&str> for CoordinateValue {
    fn from(value: &str) -> Self {
        CoordinateValue::Text(value.to_string())
    }
}

impl From<f64> for CoordinateValue {
    fn from(value: f64) -> Self {
        CoordinateValue::Number(value)
    }
}

/// What the caller asked for: a place name, a coordinate pair, or both
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationQuery {
    /// Free-text location name, trimmed and never blank
    pub name: Option<String>,
    /// Caller-supplied coordinate pair
    pub coordinates: Option<Coordinate>,
}

impl LocationQuery {
    /// Build a query from raw request fields.
    ///
    /// Coordinates are parsed here, so format errors surface before any
    /// geocoding happens.
    pub fn parse(
        name: Option<&str>,
        latitude: Option<&CoordinateValue>,
        longitude: Option<&CoordinateValue>,
    ) -> Result<Self> {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let latitude = latitude.map(|v| v.parse("latitude")).transpose()?.flatten();
        let longitude = longitude
            .map(|v| v.parse("longitude"))
            .transpose()?
            .flatten();

        let coordinates = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)?),
            (None, None) => None,
            _ => {
                return Err(LookupError::invalid_coordinates(
                    "Latitude and longitude must be provided together",
                ));
            }
        };

        Ok(Self { name, coordinates })
    }

    /// Label shown to the user for a lookup resolved to `resolved`
    #[must_use]
    pub fn display_label(&self, resolved: &Coordinate) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => resolved.format_coordinates(),
        }
    }
}
