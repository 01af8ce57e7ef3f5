//! Location source abstraction layer
//!
//! This module abstracts the platform location engine behind a narrow trait:
//! one cancellable best-effort fix request, and one continuous stream of
//! fixes at a configured interval/accuracy. Real adapters live in the host
//! application; the crate ships a simulated backend for tests and demos.

pub mod error;
pub mod simulated;

pub use error::{SourceError, SourceResult};
pub use simulated::SimulatedSource;

use crate::core::types::Fix;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Callback through which a source delivers fixes
///
/// Shared so a source can hold it across asynchronous deliveries.
pub type FixSink = Arc<dyn Fn(Fix) + Send + Sync>;

/// Hints forwarded to the platform location engine for continuous updates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamProfile {
    /// Desired interval between periodic fixes (milliseconds)
    pub interval_ms: u32,
    /// Desired horizontal accuracy (meters)
    pub accuracy_hint_m: f64,
}

impl Default for StreamProfile {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            accuracy_hint_m: 10.0,
        }
    }
}

/// Abstraction over a platform location engine
///
/// Delivery contract: fixes arrive asynchronously on the source's own
/// schedule. Implementations must never invoke a sink from inside one of
/// these calls, must tolerate `stop_updates` with nothing pending, and must
/// support being subscribed multiple times sequentially (not concurrently)
/// over their lifetime.
pub trait LocationSource: Send {
    /// Request one best-effort current fix, delivered through `sink`
    fn request_fix(&mut self, sink: FixSink) -> SourceResult<()>;

    /// Cancel an outstanding one-shot request; no-op when nothing is pending
    ///
    /// Cancellation may race an in-flight delivery, so the caller must be
    /// prepared to discard a fix that arrives after this returns.
    fn cancel_request(&mut self) -> SourceResult<()>;

    /// Start the continuous fix stream
    fn start_updates(&mut self, profile: &StreamProfile, sink: FixSink) -> SourceResult<()>;

    /// Stop the continuous fix stream; no-op when not streaming
    fn stop_updates(&mut self) -> SourceResult<()>;

    /// Whether the continuous stream is currently active
    fn is_streaming(&self) -> bool;
}
