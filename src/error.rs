//! Error types and handling for the weather lookup service

use std::any::Any;

use thiserror::Error;

/// Shown to users for failures they cannot act on
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Main error type for a weather lookup
#[derive(Error, Debug)]
pub enum LookupError {
    /// Neither a location name nor a coordinate pair was supplied
    #[error("No location or coordinates provided")]
    MissingInput,

    /// Latitude/longitude could not be parsed or are out of range
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinateFormat { message: String },

    /// The geocoder found nothing for the supplied name
    #[error("Location not found: {name}")]
    LocationNotFound { name: String },

    /// The supplied name and coordinates are too far apart
    #[error("Location name and coordinates are {distance_km:.1} km apart")]
    CoordinateMismatch { distance_km: f64 },

    /// The weather provider could not be reached
    #[error("Weather service unavailable")]
    WeatherServiceUnavailable,

    /// The weather provider answered with an error or unusable data
    #[error("Weather provider error: {message}")]
    WeatherProvider { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Anything else that went wrong while serving a request
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LookupError {
    /// Create a new coordinate format error
    pub fn invalid_coordinates<S: Into<String>>(message: S) -> Self {
        Self::InvalidCoordinateFormat {
            message: message.into(),
        }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(name: S) -> Self {
        Self::LocationNotFound { name: name.into() }
    }

    /// Create a new weather provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::WeatherProvider {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Turn a caught handler panic into an internal error, keeping its message for the logs
    pub fn from_panic(panic: Box<dyn Any + Send + 'static>) -> Self {
        let detail = if let Some(message) = panic.downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = panic.downcast_ref::<&str>() {
            (*message).to_string()
        } else {
            "unknown panic payload".to_string()
        };
        Self::internal(format!("request handler panicked: {detail}"))
    }

    /// Whether the failure was caused by the caller's input
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LookupError::MissingInput
                | LookupError::InvalidCoordinateFormat { .. }
                | LookupError::CoordinateMismatch { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LookupError::MissingInput => "No location or coordinates provided".to_string(),
            LookupError::InvalidCoordinateFormat { .. } => {
                "Invalid latitude or longitude format".to_string()
            }
            LookupError::LocationNotFound { .. } => "Location not found".to_string(),
            LookupError::CoordinateMismatch { .. } => {
                "Location name and coordinates do not match".to_string()
            }
            LookupError::WeatherServiceUnavailable => "Weather service unavailable".to_string(),
            LookupError::WeatherProvider { message } => message.clone(),
            LookupError::Config { .. } | LookupError::Internal { .. } => {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            }
        }
    }
}
