//! Data models for the weather lookup service
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates and the caller's lookup query
//! - Weather: the normalized current conditions and forecast

pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{Coordinate, CoordinateValue, LocationQuery};
pub use weather::{CurrentConditions, ForecastEntry, WeatherResult};
