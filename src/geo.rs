//! Great-circle distance on the WGS-84 ellipsoid.

use geo::{GeodesicDistance, Point};
use serde::{Deserialize, Serialize};

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within [-90, 90] x [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lng, p.lat)
    }
}

/// Geodesic distance in meters (Karney's algorithm). Identical points give 0
/// and antipodal points converge. A point outside the coordinate ranges gives
/// NaN, which compares false against any radius.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    if !a.is_valid() || !b.is_valid() {
        return f64::NAN;
    }
    if a == b {
        return 0.0;
    }
    Point::from(a).geodesic_distance(&Point::from(b)).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PARIS: GeoPoint = GeoPoint { lat: 48.8566, lng: 2.3522 };

    #[test]
    fn identical_points_are_zero() {
        assert_eq!(distance(PARIS, PARIS), 0.0);
    }

    #[test]
    fn short_hop_inside_paris() {
        let d = distance(PARIS, GeoPoint::new(48.8570, 2.3530));
        assert!(d > 60.0 && d < 100.0, "got {d}");
    }

    #[test]
    fn paris_to_london_is_about_344_km() {
        let london = GeoPoint::new(51.5074, -0.1278);
        let d = distance(PARIS, london);
        assert!((340_000.0..348_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn one_degree_of_latitude_at_equator() {
        // WGS-84 meridian arc from 0 to 1 degree.
        let d = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 110_574.4).abs() < 2.0, "got {d}");
    }

    #[test]
    fn antipodal_points_do_not_blow_up() {
        let d = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!((19_900_000.0..20_100_000.0).contains(&d), "got {d}");

        let poles = distance(GeoPoint::new(90.0, 0.0), GeoPoint::new(-90.0, 0.0));
        assert!((poles - 20_003_931.5).abs() < 1.0, "got {poles}");
    }

    #[test]
    fn invalid_points_have_no_distance() {
        assert!(distance(GeoPoint::new(f64::NAN, 2.35), PARIS).is_nan());
        assert!(distance(PARIS, GeoPoint::new(48.85, f64::INFINITY)).is_nan());
        assert!(distance(GeoPoint::new(1000.0, 2.35), PARIS).is_nan());
        let bogus = GeoPoint::new(1000.0, 2.35);
        assert!(distance(bogus, bogus).is_nan());
    }

    fn point() -> impl Strategy<Value = GeoPoint> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| GeoPoint::new(lat, lng))
    }

    proptest! {
        #[test]
        fn distance_to_self_is_zero(p in point()) {
            prop_assert_eq!(distance(p, p), 0.0);
        }

        #[test]
        fn distance_is_symmetric(a in point(), b in point()) {
            let ab = distance(a, b);
            let ba = distance(b, a);
            prop_assert!((ab - ba).abs() < 1e-3, "{} vs {}", ab, ba);
        }

        #[test]
        fn distance_is_non_negative_and_bounded(a in point(), b in point()) {
            let d = distance(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= 20_004_000.0);
        }
    }
}
