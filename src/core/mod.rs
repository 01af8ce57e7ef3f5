//! Core types and constants for location tracking and proximity gating

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
