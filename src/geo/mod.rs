//! Geodesic distance calculations

pub mod haversine;

pub use haversine::distance_m;
