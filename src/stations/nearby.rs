use crate::geo::{distance, GeoPoint};

use super::model::{Station, StationWithDistance};

pub const DEFAULT_RADIUS_METERS: i64 = 5000;

/// Stations within `radius_meters` of `center` (inclusive), nearest first.
///
/// Filtering uses the exact distance; the attached value is rounded to
/// centimeters. Equal distances keep the order of `stations`.
pub fn query_nearby(
    center: GeoPoint,
    radius_meters: i64,
    stations: impl IntoIterator<Item = Station>,
) -> Vec<StationWithDistance> {
    let radius = radius_meters as f64;
    let mut nearby: Vec<StationWithDistance> = stations
        .into_iter()
        .filter_map(|station| {
            let d = distance(center, station.position());
            (d <= radius).then(|| StationWithDistance {
                station,
                distance: round_cm(d),
            })
        })
        .collect();

    // stable
    nearby.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    nearby
}

fn round_cm(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::model::{NewStation, DEFAULT_STATUS};
    use proptest::prelude::*;

    fn station(id: i64, code: &str, lat: f64, lng: f64) -> Station {
        NewStation {
            code: code.into(),
            name: format!("station {code}"),
            latitude: lat,
            longitude: lng,
            nb_bikes: 0,
            nb_e_bikes: 0,
            nb_free_docks: 0,
            status: DEFAULT_STATUS.into(),
        }
        .into_station(id)
    }

    const CENTER: GeoPoint = GeoPoint { lat: 48.8566, lng: 2.3522 };

    #[test]
    fn finds_both_nearby_stations_nearest_first() {
        let stations = vec![
            station(1, "B", 48.8570, 2.3530),
            station(2, "A", 48.8566, 2.3522),
        ];
        let out = query_nearby(CENTER, 100, stations);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].station.code, "A");
        assert_eq!(out[0].distance, 0.0);
        assert_eq!(out[1].station.code, "B");
        assert!(out[1].distance > 0.0 && out[1].distance <= 100.0);
    }

    #[test]
    fn excludes_stations_outside_radius() {
        let stations = vec![
            station(1, "near", 48.8570, 2.3530),
            station(2, "far", 48.8738, 2.2950),
        ];
        let out = query_nearby(CENTER, 1000, stations);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].station.code, "near");
    }

    #[test]
    fn zero_radius_keeps_only_coincident_points() {
        let stations = vec![
            station(1, "same", CENTER.lat, CENTER.lng),
            station(2, "near", 48.8570, 2.3530),
        ];
        let out = query_nearby(CENTER, 0, stations);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].station.code, "same");
    }

    #[test]
    fn negative_radius_matches_nothing() {
        let out = query_nearby(CENTER, -1, vec![station(1, "same", CENTER.lat, CENTER.lng)]);
        assert!(out.is_empty());
    }

    #[test]
    fn invalid_center_matches_nothing() {
        let sydney = || vec![station(1, "sydney", -33.8688, 151.2093)];
        assert!(query_nearby(GeoPoint::new(f64::NAN, 2.35), 0, sydney()).is_empty());
        assert!(query_nearby(GeoPoint::new(1000.0, 2.35), 0, sydney()).is_empty());
        assert!(query_nearby(GeoPoint::new(f64::NAN, 2.35), 20_000_000, sydney()).is_empty());
    }

    #[test]
    fn empty_input_gives_empty_result() {
        assert!(query_nearby(CENTER, 5000, Vec::new()).is_empty());
    }

    #[test]
    fn ties_keep_scan_order() {
        let stations = vec![
            station(1, "first", 48.8570, 2.3530),
            station(2, "second", 48.8570, 2.3530),
            station(3, "third", 48.8570, 2.3530),
        ];
        let out = query_nearby(CENTER, 500, stations);
        let codes: Vec<_> = out.iter().map(|s| s.station.code.as_str()).collect();
        assert_eq!(codes, ["first", "second", "third"]);
    }

    #[test]
    fn attached_distance_has_two_decimals() {
        let out = query_nearby(CENTER, 1000, vec![station(1, "B", 48.8570, 2.3530)]);
        let d = out[0].distance;
        assert_eq!(d, (d * 100.0).round() / 100.0);
        let exact = distance(CENTER, GeoPoint::new(48.8570, 2.3530));
        assert!((d - exact).abs() <= 0.005);
    }

    #[test]
    fn huge_radius_returns_everything() {
        let stations = vec![
            station(1, "paris", 48.8566, 2.3522),
            station(2, "sydney", -33.8688, 151.2093),
            station(3, "anchorage", 61.2181, -149.9003),
        ];
        assert_eq!(query_nearby(CENTER, 21_000_000, stations).len(), 3);
    }

    fn stations_strategy() -> impl Strategy<Value = Vec<Station>> {
        prop::collection::vec((48.80f64..48.92, 2.25f64..2.45), 0..40).prop_map(|coords| {
            coords
                .into_iter()
                .enumerate()
                .map(|(i, (lat, lng))| station(i as i64 + 1, &i.to_string(), lat, lng))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn membership_iff_within_radius(stations in stations_strategy(), radius in 0i64..10_000) {
            let out = query_nearby(CENTER, radius, stations.clone());
            for s in &stations {
                let inside = distance(CENTER, s.position()) <= radius as f64;
                let listed = out.iter().any(|n| n.station.id == s.id);
                prop_assert_eq!(inside, listed, "station {}", s.id);
            }
        }

        #[test]
        fn output_is_sorted_by_distance(stations in stations_strategy(), radius in 0i64..20_000) {
            let out = query_nearby(CENTER, radius, stations);
            prop_assert!(out.windows(2).all(|w| w[0].distance <= w[1].distance));
        }
    }
}
