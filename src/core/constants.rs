//! Physical constants and default policy parameters

/// Earth mean radius used for great-circle distances (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default admission radius for submitting a review or marking a visit (meters)
pub const DEFAULT_REVIEW_RADIUS_M: f64 = 50.0;

/// Default admission radius for confirming a new spot's placement (meters)
pub const DEFAULT_PLACEMENT_RADIUS_M: f64 = 100.0;
