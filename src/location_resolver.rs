//! Location Resolution Module
//!
//! Turns a [`LocationQuery`] into the single coordinate the weather lookup
//! uses. When both a name and coordinates are given, the geocoded name wins,
//! provided the two agree within the configured distance.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::distance::calculate_distance;
use crate::geocoding::Geocoder;
use crate::models::{Coordinate, LocationQuery};
use crate::{LookupError, Result};

/// Service for resolving location queries
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    max_mismatch_km: f64,
}

impl LocationResolver {
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>, max_mismatch_km: f64) -> Self {
        Self {
            geocoder,
            max_mismatch_km,
        }
    }

    /// Resolve a query into an authoritative coordinate
    pub async fn resolve(&self, query: &LocationQuery) -> Result<Coordinate> {
        debug!("Resolving location query: {:?}", query);

        let coordinate = match (query.name.as_deref(), query.coordinates) {
            (Some(name), Some(supplied)) => self.resolve_cross_checked(name, supplied).await?,
            (None, Some(supplied)) => supplied,
            (Some(name), None) => self.resolve_name(name).await?,
            (None, None) => return Err(LookupError::MissingInput),
        };

        debug!(
            "Resolved location to ({:.4}, {:.4})",
            coordinate.latitude, coordinate.longitude
        );
        Ok(coordinate)
    }

    /// Resolve a location name to coordinates via geocoding
    async fn resolve_name(&self, name: &str) -> Result<Coordinate> {
        debug!("Geocoding location name: {}", name);

        self.geocoder
            .resolve(name)
            .await
            .ok_or_else(|| LookupError::location_not_found(name))
    }

    /// Geocode `name` and make sure it lies close to the supplied coordinates
    async fn resolve_cross_checked(&self, name: &str, supplied: Coordinate) -> Result<Coordinate> {
        let geocoded = self.resolve_name(name).await?;

        let distance_km = calculate_distance(&geocoded, &supplied);
        if distance_km.is_nan() || distance_km > self.max_mismatch_km {
            warn!(
                "'{}' geocodes to ({:.4}, {:.4}), {:.1} km from supplied ({:.4}, {:.4})",
                name,
                geocoded.latitude,
                geocoded.longitude,
                distance_km,
                supplied.latitude,
                supplied.longitude
            );
            return Err(LookupError::CoordinateMismatch { distance_km });
        }

        debug!(
            "'{}' agrees with supplied coordinates ({:.1} km apart)",
            name, distance_km
        );
        Ok(geocoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CoordinateValue;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PARIS: Coordinate = Coordinate {
        latitude: 48.8566,
        longitude: 2.3522,
    };

    const SOUTH_POLE_CAMP: Coordinate = Coordinate {
        latitude: -87.5,
        longitude: -180.0,
    };

    /// Knows Paris and a camp near the south pole
    #[derive(Default)]
    struct FakeGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn resolve(&self, name: &str) -> Option<Coordinate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match name {
                "Paris" => Some(PARIS),
                "South Pole Camp" => Some(SOUTH_POLE_CAMP),
                _ => None,
            }
        }
    }

    fn resolver() -> (LocationResolver, Arc<FakeGeocoder>) {
        let geocoder = Arc::new(FakeGeocoder::default());
        (LocationResolver::new(geocoder.clone(), 50.0), geocoder)
    }

    fn query(name: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> LocationQuery {
        let lat = lat.map(CoordinateValue::from);
        let lon = lon.map(CoordinateValue::from);
        LocationQuery::parse(name, lat.as_ref(), lon.as_ref()).unwrap()
    }

    #[tokio::test]
    async fn test_name_and_nearby_coordinates_use_geocoded() {
        let (resolver, geocoder) = resolver();
        let supplied = query(Some("Paris"), Some(48.80), Some(2.30));

        let coordinate = resolver.resolve(&supplied).await.unwrap();

        assert_eq!(coordinate, PARIS);
        assert_ne!(Some(coordinate), supplied.coordinates);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_name_and_distant_coordinates_mismatch() {
        let (resolver, _) = resolver();
        let err = resolver
            .resolve(&query(Some("Paris"), Some(0.0), Some(0.0)))
            .await
            .unwrap_err();

        match err {
            LookupError::CoordinateMismatch { distance_km } => assert!(distance_km > 5000.0),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case("Paris", 49.2, 2.3522, true)] // ~38 km north
    #[case("Paris", 49.4, 2.3522, false)] // ~60 km north
    #[case("South Pole Camp", 87.5, 0.0, false)] // antipode
    #[case("South Pole Camp", -87.5, -180.0, true)]
    #[tokio::test]
    async fn test_mismatch_threshold(
        #[case] name: &str,
        #[case] lat: f64,
        #[case] lon: f64,
        #[case] accepted: bool,
    ) {
        let (resolver, _) = resolver();
        let result = resolver.resolve(&query(Some(name), Some(lat), Some(lon))).await;
        assert_eq!(result.is_ok(), accepted, "{result:?}");
    }

    #[tokio::test]
    async fn test_antipodal_coordinates_mismatch() {
        let (resolver, _) = resolver();
        let err = resolver
            .resolve(&query(Some("South Pole Camp"), Some(87.5), Some(0.0)))
            .await
            .unwrap_err();

        match err {
            LookupError::CoordinateMismatch { distance_km } => {
                assert!(distance_km.is_finite());
                assert!(distance_km > 20_000.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_name_and_coordinates_unknown_name() {
        let (resolver, _) = resolver();
        let err = resolver
            .resolve(&query(Some("Atlantis"), Some(48.85), Some(2.35)))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::LocationNotFound { .. }));
    }

    #[tokio::test]
    async fn test_coordinates_only_skip_geocoding() {
        let (resolver, geocoder) = resolver();
        let coordinate = resolver
            .resolve(&query(None, Some(-33.8688), Some(151.2093)))
            .await
            .unwrap();

        assert_eq!(coordinate.latitude, -33.8688);
        assert_eq!(coordinate.longitude, 151.2093);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_name_only() {
        let (resolver, geocoder) = resolver();
        let coordinate = resolver.resolve(&query(Some("Paris"), None, None)).await.unwrap();
        assert_eq!(coordinate, PARIS);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_name_only_not_found() {
        let (resolver, _) = resolver();
        let err = resolver
            .resolve(&query(Some("Atlantis"), None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::LocationNotFound { .. }));
    }

    #[tokio::test]
    async fn test_nothing_supplied() {
        let (resolver, geocoder) = resolver();
        let err = resolver.resolve(&query(Some(""), None, None)).await.unwrap_err();
        assert!(matches!(err, LookupError::MissingInput));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }
}
