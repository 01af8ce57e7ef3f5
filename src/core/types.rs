//! Core data types shared across the crate

use serde::{Deserialize, Serialize};

/// Geodetic coordinate in decimal degrees
///
/// Latitude is in [-90, 90], longitude in [-180, 180]. Raw values from the
/// data layer go through `validation::validate_coordinate` before they are
/// used in any distance computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One reported location sample
///
/// Produced only by a `LocationSource`. The timestamp is the production
/// instant reported by the platform (milliseconds since epoch) and decides
/// which of two competing samples is the more recent one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Acquisition instant (milliseconds since epoch)
    pub timestamp_ms: u64,
    /// Estimated horizontal accuracy (meters), if the platform reports one
    pub accuracy_m: Option<f64>,
}

impl Fix {
    pub fn new(coordinate: Coordinate, timestamp_ms: u64) -> Self {
        Self {
            coordinate,
            timestamp_ms,
            accuracy_m: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }
}
