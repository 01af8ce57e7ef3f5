//! Validation error types

use std::fmt;

/// Errors produced when raw location data fails boundary validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Latitude outside [-90, 90] degrees
    LatitudeOutOfRange { value: f64 },
    /// Longitude outside [-180, 180] degrees
    LongitudeOutOfRange { value: f64 },
    /// NaN or infinite value where a finite number is required
    NonFiniteValue { field: &'static str },
    /// Reported accuracy below zero meters
    NegativeAccuracy { value: f64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::LatitudeOutOfRange { value } => {
                write!(f, "Latitude out of range: {}", value)
            }
            ValidationError::LongitudeOutOfRange { value } => {
                write!(f, "Longitude out of range: {}", value)
            }
            ValidationError::NonFiniteValue { field } => {
                write!(f, "Non-finite value for {}", field)
            }
            ValidationError::NegativeAccuracy { value } => {
                write!(f, "Negative accuracy: {} m", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
