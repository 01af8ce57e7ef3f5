//! Shared location tracking and proximity gating
//!
//! The core of a location-tagged points-of-interest client: a
//! reference-counted subscription manager that multiplexes all interested
//! screens onto a single hardware location stream, and a proximity gate that
//! admits user actions only while the current fix is close enough to a
//! target coordinate.

pub mod core;
pub mod geo;
pub mod source;
pub mod tracker;
pub mod gate;
pub mod validation;
pub mod utils;

// Re-export commonly used types
pub use crate::core::constants::EARTH_RADIUS_M;
pub use crate::core::types::{Coordinate, Fix};
pub use crate::gate::{
    attach, evaluate, ActionState, AttemptOutcome, CommitOutcome, ProximityGatedAction,
    ProximityVerdict, RadiusPolicy, RejectReason,
};
pub use crate::geo::haversine::distance_m;
pub use crate::source::{
    FixSink, LocationSource, SimulatedSource, SourceError, SourceResult, StreamProfile,
};
pub use crate::tracker::{
    CancellationToken, EventObserver, FixObserver, LocationTracker, ObserverHandle,
    SubscriptionHandle, TrackerEvent, TrackerSnapshot,
};
pub use crate::utils::config::{AppConfig, ConfigError};
pub use crate::validation::{validate_coordinate, validate_fix, ValidationError, ValidationResult};
