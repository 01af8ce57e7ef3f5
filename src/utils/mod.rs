//! Configuration and support utilities

pub mod config;

pub use config::{AppConfig, ConfigError};
