//! Application configuration
//!
//! Stream hints and gate radii, loadable from a JSON file. Validation runs
//! before any value reaches the tracker or a gate policy.

use crate::gate::RadiusPolicy;
use crate::source::StreamProfile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Crate-wide configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interval and accuracy hints for the continuous stream
    pub stream: StreamProfile,
    /// Admission radius for review submission (meters)
    pub review_radius_m: f64,
    /// Admission radius for marking a spot visited (meters)
    pub visit_radius_m: f64,
    /// Admission radius for confirming a new spot's placement (meters)
    pub placement_radius_m: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stream: StreamProfile::default(),
            review_radius_m: RadiusPolicy::review().radius_m,
            visit_radius_m: RadiusPolicy::review().radius_m,
            placement_radius_m: RadiusPolicy::placement().radius_m,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: e.to_string(),
        })?;
        let config: AppConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::SerializationError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
                message: e.to_string(),
            })?;
        fs::write(path, contents).map_err(|e| ConfigError::IoError {
            message: e.to_string(),
        })
    }

    /// Validate all parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.interval_ms == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "stream.interval_ms".to_string(),
                value: "0".to_string(),
                reason: "interval must be positive".to_string(),
            });
        }
        if !self.stream.accuracy_hint_m.is_finite() || self.stream.accuracy_hint_m <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "stream.accuracy_hint_m".to_string(),
                value: self.stream.accuracy_hint_m.to_string(),
                reason: "accuracy hint must be a positive number".to_string(),
            });
        }
        Self::validate_radius("review_radius_m", self.review_radius_m)?;
        Self::validate_radius("visit_radius_m", self.visit_radius_m)?;
        Self::validate_radius("placement_radius_m", self.placement_radius_m)?;
        Ok(())
    }

    fn validate_radius(parameter: &str, radius_m: f64) -> Result<(), ConfigError> {
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: parameter.to_string(),
                value: radius_m.to_string(),
                reason: "radius must be a positive number".to_string(),
            });
        }
        Ok(())
    }

    /// Policy for review submission
    pub fn review_policy(&self) -> RadiusPolicy {
        RadiusPolicy::new(self.review_radius_m)
    }

    /// Policy for marking a spot visited
    pub fn visit_policy(&self) -> RadiusPolicy {
        RadiusPolicy::new(self.visit_radius_m)
    }

    /// Policy for confirming a new spot's placement
    pub fn placement_policy(&self) -> RadiusPolicy {
        RadiusPolicy::new(self.placement_radius_m)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    IoError { message: String },
    /// JSON serialization/deserialization error
    SerializationError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid {} = {}: {}", parameter, value, reason)
            }
            ConfigError::IoError { message } => {
                write!(f, "Configuration I/O error: {}", message)
            }
            ConfigError::SerializationError { message } => {
                write!(f, "Configuration serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
