//! Proximity admission policy
//!
//! Decides whether the user's current fix lies within a configured radius of
//! a target coordinate, and by how much.

pub mod action;

pub use action::{
    attach, ActionState, AttemptOutcome, CommitOutcome, ProximityGatedAction, RejectReason,
};

use crate::core::constants::{DEFAULT_PLACEMENT_RADIUS_M, DEFAULT_REVIEW_RADIUS_M};
use crate::core::types::{Coordinate, Fix};
use crate::geo::haversine::distance_m;
use serde::{Deserialize, Serialize};

/// Allowed zone radius around a target coordinate
///
/// Immutable per action instance. Radii must be positive; configuration
/// validation enforces this at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusPolicy {
    pub radius_m: f64,
}

impl RadiusPolicy {
    /// Build a policy with the given radius in metres
    ///
    /// The radius must be finite and strictly positive.
    pub fn new(radius_m: f64) -> Self {
        debug_assert!(
            radius_m.is_finite() && radius_m > 0.0,
            "radius must be finite and positive, got {}",
            radius_m
        );
        Self { radius_m }
    }

    /// Default policy for review submission and visit marking
    pub fn review() -> Self {
        Self::new(DEFAULT_REVIEW_RADIUS_M)
    }

    /// Default policy for confirming a new spot's placement
    pub fn placement() -> Self {
        Self::new(DEFAULT_PLACEMENT_RADIUS_M)
    }
}

/// Outcome of a proximity evaluation
///
/// Recomputed on demand from the current fix and a target; never stored as
/// authoritative state. `margin_m` is how much closer the user could drift
/// before leaving the zone, negative when already outside — UI renders it as
/// "move closer, N m to go".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityVerdict {
    pub within_zone: bool,
    pub distance_m: f64,
    pub margin_m: f64,
}

/// Evaluate whether `fix` lies within the allowed zone around `target`
///
/// Pure and deterministic. The zone boundary is inclusive: a user exactly at
/// the radius edge is admitted. Callers without a current fix never reach
/// this function; `ProximityGatedAction` supplies the "no fix yet" policy.
pub fn evaluate(fix: &Fix, target: Coordinate, policy: RadiusPolicy) -> ProximityVerdict {
    let distance = distance_m(fix.coordinate, target);
    ProximityVerdict {
        within_zone: distance <= policy.radius_m,
        distance_m: distance,
        margin_m: policy.radius_m - distance,
    }
}
