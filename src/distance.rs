//! Great-circle distance between coordinates

use haversine::{Location as HaversineLocation, Units, distance};

use crate::models::Coordinate;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers (Earth radius 6371 km).
///
/// Always finite for valid coordinates: near-antipodal pairs, where the
/// haversine term rounds past 1, report half the circumference.
#[must_use]
pub fn calculate_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let from_haversine = HaversineLocation {
        latitude: from.latitude,
        longitude: from.longitude,
    };
    let to_haversine = HaversineLocation {
        latitude: to.latitude,
        longitude: to.longitude,
    };
    let km = distance(from_haversine, to_haversine, Units::Kilometers);
    if km.is_nan() {
        return EARTH_RADIUS_KM * std::f64::consts::PI;
    }
    km
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn coordinate(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate {
            latitude,
            longitude,
        }
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(48.8566, 2.3522)]
    #[case(-33.8688, 151.2093)]
    #[case(90.0, 180.0)]
    fn test_distance_to_self_is_zero(#[case] lat: f64, #[case] lon: f64) {
        let point = coordinate(lat, lon);
        assert_eq!(calculate_distance(&point, &point), 0.0);
    }

    #[rstest]
    #[case((48.8566, 2.3522), (51.5074, -0.1278))]
    #[case((0.0, 0.0), (48.8566, 2.3522))]
    #[case((-33.8688, 151.2093), (40.7128, -74.0060))]
    #[case((89.9, 179.9), (-89.9, -179.9))]
    fn test_distance_is_symmetric(#[case] a: (f64, f64), #[case] b: (f64, f64)) {
        let a = coordinate(a.0, a.1);
        let b = coordinate(b.0, b.1);
        let there = calculate_distance(&a, &b);
        let back = calculate_distance(&b, &a);
        assert!((there - back).abs() < 1e-9, "{there} != {back}");
    }

    #[test]
    fn test_paris_to_london() {
        let paris = coordinate(48.8566, 2.3522);
        let london = coordinate(51.5074, -0.1278);
        let km = calculate_distance(&paris, &london);
        assert!((km - 343.5).abs() < 2.0, "unexpected distance {km}");
    }

    #[test]
    fn test_quarter_meridian() {
        let equator = coordinate(0.0, 0.0);
        let pole = coordinate(90.0, 0.0);
        let km = calculate_distance(&equator, &pole);
        let expected = 6371.0 * std::f64::consts::FRAC_PI_2;
        assert!((km - expected).abs() < 1e-6);
    }

    #[rstest]
    #[case((-87.5, -180.0), (87.5, 0.0))]
    #[case((0.0, 0.0), (0.0, 180.0))]
    #[case((45.0, 90.0), (-45.0, -90.0))]
    #[case((89.9, 179.9), (-89.9, -0.1))]
    fn test_antipodal_distance_is_half_circumference(
        #[case] a: (f64, f64),
        #[case] b: (f64, f64),
    ) {
        let a = coordinate(a.0, a.1);
        let b = coordinate(b.0, b.1);
        let half_circumference = 6371.0 * std::f64::consts::PI;
        for km in [calculate_distance(&a, &b), calculate_distance(&b, &a)] {
            assert!(km.is_finite(), "distance is {km}");
            assert!((km - half_circumference).abs() < 1.0, "unexpected distance {km}");
        }
    }
}
