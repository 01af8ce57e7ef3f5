//! Great-circle distance on a spherical Earth model

use crate::core::constants::EARTH_RADIUS_M;
use crate::core::types::Coordinate;

/// Surface distance in meters between two coordinates
///
/// Haversine formula on the Earth mean radius. Symmetric, zero for
/// bitwise-equal coordinates, and monotone in angular separation. Always
/// returns a finite non-negative value for valid inputs; NaN latitudes or
/// longitudes propagate a NaN result, so malformed coordinates must be
/// rejected upstream (see `validation`).
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);

    // Floating-point overshoot at coincident or antipodal points can push the
    // intermediate term just outside [0, 1], which would feed a domain error
    // into the inverse trig step.
    let h = h.clamp(0.0, 1.0);

    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * central_angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_identical_coordinates_are_zero_distance() {
        let p = Coordinate::new(47.6062, -122.3321);
        assert_eq!(distance_m(p, p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(47.6062, -122.3321);
        let b = Coordinate::new(45.5152, -122.6784);
        assert_eq!(distance_m(a, b), distance_m(b, a));
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        // One degree of arc on the mean-radius sphere is ~111,195 m.
        let d = distance_m(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((d - 111_195.0).abs() < 50.0, "got {}", d);
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let d = distance_m(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert!(d.is_finite());
        // Half the circumference of the mean-radius sphere.
        assert!((d - PI * EARTH_RADIUS_M).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_monotone_with_angular_separation() {
        let origin = Coordinate::new(0.0, 0.0);
        let near = distance_m(origin, Coordinate::new(0.0, 0.5));
        let mid = distance_m(origin, Coordinate::new(0.0, 1.0));
        let far = distance_m(origin, Coordinate::new(0.0, 2.0));
        assert!(near < mid && mid < far);
    }

    #[test]
    fn test_nan_input_propagates_nan() {
        let d = distance_m(Coordinate::new(f64::NAN, 0.0), Coordinate::new(0.0, 0.0));
        assert!(d.is_nan());
    }

    #[test]
    fn test_short_distance_precision() {
        // ~45 m north of the target, well within float precision.
        let target = Coordinate::new(47.0, 8.0);
        let nearby = Coordinate::new(47.0 + 45.0 / 111_195.0, 8.0);
        let d = distance_m(target, nearby);
        assert!((d - 45.0).abs() < 0.1, "got {}", d);
    }
}
