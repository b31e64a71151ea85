//! Geographic primitives: coordinates and great-circle distance

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Two points closer than this are considered the same location
pub const EXACT_LOCATION_THRESHOLD_M: f64 = 50.0;

/// Fallback origin when the device location is unknown (San José, Costa Rica)
pub const DEFAULT_ORIGIN: Coordinates = Coordinates {
    latitude: 9.9281,
    longitude: -84.0907,
};

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and within the valid latitude/longitude ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Distance in meters to another point
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_distance(self, other)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Great-circle distance in meters between two points.
///
/// Inputs must be finite; callers skip records with missing or invalid
/// coordinates before calling this.
pub fn haversine_distance(a: &Coordinates, b: &Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Coordinate string used when no place name can be resolved ("lat, lng")
pub fn format_coordinates(point: &Coordinates) -> String {
    point.to_string()
}

/// Whether two points fall within the exact-location threshold
pub fn is_colocated(a: &Coordinates, b: &Coordinates) -> bool {
    haversine_distance(a, b) <= EXACT_LOCATION_THRESHOLD_M
}

/// Move a point by a number of meters north and east.
///
/// Small-offset approximation, used to build fixtures around a point.
pub fn offset_meters(point: &Coordinates, north_m: f64, east_m: f64) -> Coordinates {
    let d_lat = north_m / EARTH_RADIUS_M;
    let d_lng = east_m / (EARTH_RADIUS_M * point.latitude.to_radians().cos());

    Coordinates {
        latitude: point.latitude + d_lat.to_degrees(),
        longitude: point.longitude + d_lng.to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let p = Coordinates::new(9.9281, -84.0907);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_san_jose_to_cartago() {
        // San José to Cartago is roughly 18-19 km
        let san_jose = Coordinates::new(9.9281, -84.0907);
        let cartago = Coordinates::new(9.8644, -83.9194);
        let d = haversine_distance(&san_jose, &cartago);
        assert!((d - 20_000.0).abs() < 2_500.0, "got {d}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinates::new(37.7749, -122.4194);
        let b = Coordinates::new(34.0522, -118.2437);
        let ab = haversine_distance(&a, &b);
        let ba = haversine_distance(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
        assert!((ab - 559_000.0).abs() < 10_000.0, "got {ab}");
    }

    #[test]
    fn test_offset_meters_round_trip_distance() {
        let origin = DEFAULT_ORIGIN;
        let moved = offset_meters(&origin, 10.0, 0.0);
        let d = haversine_distance(&origin, &moved);
        assert!((d - 10.0).abs() < 0.01, "got {d}");

        let moved = offset_meters(&origin, 0.0, 30.0);
        let d = haversine_distance(&origin, &moved);
        assert!((d - 30.0).abs() < 0.05, "got {d}");
    }

    #[test]
    fn test_colocated_threshold() {
        let origin = DEFAULT_ORIGIN;
        assert!(is_colocated(&origin, &offset_meters(&origin, 49.0, 0.0)));
        assert!(!is_colocated(&origin, &offset_meters(&origin, 51.0, 0.0)));
    }

    #[test]
    fn test_validity() {
        assert!(Coordinates::new(9.9, -84.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, -84.0).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_format_coordinates() {
        let p = Coordinates::new(9.92814567, -84.09071234);
        assert_eq!(format_coordinates(&p), "9.9281, -84.0907");
    }
}
