//! Coordinate and fix validation

use crate::core::types::{Coordinate, Fix};
use crate::validation::error::{ValidationError, ValidationResult};

/// Validate raw latitude/longitude degrees into a `Coordinate`
pub fn validate_coordinate(lat: f64, lon: f64) -> ValidationResult<Coordinate> {
    if !lat.is_finite() {
        return Err(ValidationError::NonFiniteValue { field: "latitude" });
    }
    if !lon.is_finite() {
        return Err(ValidationError::NonFiniteValue { field: "longitude" });
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ValidationError::LatitudeOutOfRange { value: lat });
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ValidationError::LongitudeOutOfRange { value: lon });
    }
    Ok(Coordinate::new(lat, lon))
}

/// Validate a raw platform location sample into a `Fix`
pub fn validate_fix(
    lat: f64,
    lon: f64,
    timestamp_ms: u64,
    accuracy_m: Option<f64>,
) -> ValidationResult<Fix> {
    let coordinate = validate_coordinate(lat, lon)?;

    if let Some(accuracy) = accuracy_m {
        if !accuracy.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "accuracy" });
        }
        if accuracy < 0.0 {
            return Err(ValidationError::NegativeAccuracy { value: accuracy });
        }
    }

    let mut fix = Fix::new(coordinate, timestamp_ms);
    if let Some(accuracy) = accuracy_m {
        fix = fix.with_accuracy(accuracy);
    }
    Ok(fix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinate() {
        let c = validate_coordinate(47.6062, -122.3321).unwrap();
        assert_eq!(c.lat, 47.6062);
        assert_eq!(c.lon, -122.3321);
    }

    #[test]
    fn test_boundary_values_accepted() {
        assert!(validate_coordinate(90.0, 180.0).is_ok());
        assert!(validate_coordinate(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_latitude_out_of_range() {
        let err = validate_coordinate(90.1, 0.0).unwrap_err();
        assert_eq!(err, ValidationError::LatitudeOutOfRange { value: 90.1 });
    }

    #[test]
    fn test_longitude_out_of_range() {
        let err = validate_coordinate(0.0, -180.5).unwrap_err();
        assert_eq!(err, ValidationError::LongitudeOutOfRange { value: -180.5 });
    }

    #[test]
    fn test_nan_rejected() {
        let err = validate_coordinate(f64::NAN, 0.0).unwrap_err();
        assert_eq!(err, ValidationError::NonFiniteValue { field: "latitude" });
    }

    #[test]
    fn test_fix_with_negative_accuracy_rejected() {
        let err = validate_fix(0.0, 0.0, 1000, Some(-1.0)).unwrap_err();
        assert_eq!(err, ValidationError::NegativeAccuracy { value: -1.0 });
    }

    #[test]
    fn test_fix_accepted() {
        let fix = validate_fix(10.0, 20.0, 1000, Some(5.0)).unwrap();
        assert_eq!(fix.coordinate, Coordinate::new(10.0, 20.0));
        assert_eq!(fix.timestamp_ms, 1000);
        assert_eq!(fix.accuracy_m, Some(5.0));
    }
}
