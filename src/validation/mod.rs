//! Boundary validation for raw coordinate data
//!
//! Distance math assumes well-formed coordinates; everything arriving from
//! the data layer or a platform adapter is checked here first.

pub mod coordinate;
pub mod error;

pub use coordinate::{validate_coordinate, validate_fix};
pub use error::{ValidationError, ValidationResult};
