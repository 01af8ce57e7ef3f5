//! Location source error types

use std::fmt;

/// Errors reported by a location source
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Location permission has not been granted
    PermissionDenied,
    /// Positioning hardware is switched off or unavailable
    HardwareDisabled,
    /// A continuous stream is already active
    AlreadyStreaming,
    /// Platform-specific failure
    Backend { details: String },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::PermissionDenied => {
                write!(f, "Location permission denied")
            }
            SourceError::HardwareDisabled => {
                write!(f, "Positioning hardware disabled")
            }
            SourceError::AlreadyStreaming => {
                write!(f, "Continuous updates already active")
            }
            SourceError::Backend { details } => {
                write!(f, "Location backend error: {}", details)
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Result type for location source operations
pub type SourceResult<T> = Result<T, SourceError>;
