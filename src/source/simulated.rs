//! Simulated location source for testing and development

use crate::core::types::Fix;
use crate::source::error::{SourceError, SourceResult};
use crate::source::{FixSink, LocationSource, StreamProfile};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct SimulatedState {
    stream_sink: Option<FixSink>,
    one_shot_sink: Option<FixSink>,
    profile: Option<StreamProfile>,
    permission_denied: bool,
    hardware_enabled: bool,
    simulate_errors: bool,
    error_probability: f64,
    best_effort_cancel: bool,
    start_count: u32,
    stop_count: u32,
    one_shot_count: u32,
    cancel_count: u32,
}

/// Simulated location source for tests and demos
///
/// Clones share the same underlying state, so a test can hand one clone to a
/// `LocationTracker` and keep another to drive deliveries and inspect
/// counters.
#[derive(Clone)]
pub struct SimulatedSource {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedSource {
    /// Create a simulated source with permission granted and hardware on
    pub fn new() -> Self {
        let state = SimulatedState {
            hardware_enabled: true,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Simulate the user denying or granting location permission
    pub fn set_permission_denied(&self, denied: bool) {
        self.lock().permission_denied = denied;
    }

    /// Simulate the positioning hardware being switched off
    pub fn set_hardware_enabled(&self, enabled: bool) {
        self.lock().hardware_enabled = enabled;
    }

    /// Enable random backend failures with the given probability (0.0 to 1.0)
    pub fn simulate_errors(&self, enable: bool, probability: f64) {
        let mut state = self.lock();
        state.simulate_errors = enable;
        state.error_probability = probability.clamp(0.0, 1.0);
    }

    /// Model a platform whose cancellation is advisory: the pending one-shot
    /// sink is kept, so a delivery can still race in after `cancel_request`
    pub fn set_best_effort_cancel(&self, enable: bool) {
        self.lock().best_effort_cancel = enable;
    }

    /// Deliver a periodic fix through the active stream, if any
    ///
    /// Returns true when a stream sink was present to receive it.
    pub fn emit_fix(&self, fix: Fix) -> bool {
        let sink = self.lock().stream_sink.clone();
        match sink {
            Some(sink) => {
                // Invoked outside the state lock, like a platform thread would.
                sink(fix);
                true
            }
            None => false,
        }
    }

    /// Resolve the pending one-shot request with the given fix
    ///
    /// Returns true when a one-shot sink was present to receive it.
    pub fn resolve_one_shot(&self, fix: Fix) -> bool {
        let sink = self.lock().one_shot_sink.take();
        match sink {
            Some(sink) => {
                sink(fix);
                true
            }
            None => false,
        }
    }

    /// Number of times the continuous stream was started
    pub fn start_count(&self) -> u32 {
        self.lock().start_count
    }

    /// Number of times the continuous stream was stopped
    pub fn stop_count(&self) -> u32 {
        self.lock().stop_count
    }

    /// Number of one-shot fix requests received
    pub fn one_shot_count(&self) -> u32 {
        self.lock().one_shot_count
    }

    /// Number of cancellations that found a pending one-shot
    pub fn cancel_count(&self) -> u32 {
        self.lock().cancel_count
    }

    /// Whether a one-shot request is currently pending
    pub fn one_shot_pending(&self) -> bool {
        self.lock().one_shot_sink.is_some()
    }

    /// The stream profile supplied on the last `start_updates`
    pub fn active_profile(&self) -> Option<StreamProfile> {
        self.lock().profile
    }

    fn check_availability(state: &SimulatedState) -> SourceResult<()> {
        if state.permission_denied {
            return Err(SourceError::PermissionDenied);
        }
        if !state.hardware_enabled {
            return Err(SourceError::HardwareDisabled);
        }
        if state.simulate_errors {
            use rand::Rng;
            let mut rng = rand::thread_rng();
            if rng.gen::<f64>() < state.error_probability {
                return Err(SourceError::Backend {
                    details: "Simulated backend failure".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSource for SimulatedSource {
    fn request_fix(&mut self, sink: FixSink) -> SourceResult<()> {
        let mut state = self.lock();
        Self::check_availability(&state)?;
        state.one_shot_count += 1;
        state.one_shot_sink = Some(sink);
        Ok(())
    }

    fn cancel_request(&mut self) -> SourceResult<()> {
        let mut state = self.lock();
        if state.one_shot_sink.is_some() {
            state.cancel_count += 1;
            if !state.best_effort_cancel {
                state.one_shot_sink = None;
            }
        }
        Ok(())
    }

    fn start_updates(&mut self, profile: &StreamProfile, sink: FixSink) -> SourceResult<()> {
        let mut state = self.lock();
        Self::check_availability(&state)?;
        if state.stream_sink.is_some() {
            return Err(SourceError::AlreadyStreaming);
        }
        state.start_count += 1;
        state.profile = Some(*profile);
        state.stream_sink = Some(sink);
        Ok(())
    }

    fn stop_updates(&mut self) -> SourceResult<()> {
        let mut state = self.lock();
        if state.stream_sink.take().is_some() {
            state.stop_count += 1;
        }
        state.profile = None;
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.lock().stream_sink.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Coordinate;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fix_at(lat: f64, lon: f64, timestamp_ms: u64) -> Fix {
        Fix::new(Coordinate::new(lat, lon), timestamp_ms)
    }

    #[test]
    fn test_start_stop_counters() {
        let mut source = SimulatedSource::new();
        assert!(!source.is_streaming());

        source
            .start_updates(&StreamProfile::default(), Arc::new(|_| {}))
            .unwrap();
        assert!(source.is_streaming());
        assert_eq!(source.start_count(), 1);

        source.stop_updates().unwrap();
        assert!(!source.is_streaming());
        assert_eq!(source.stop_count(), 1);

        // Stopping while idle is tolerated and not counted.
        source.stop_updates().unwrap();
        assert_eq!(source.stop_count(), 1);
    }

    #[test]
    fn test_double_start_rejected() {
        let mut source = SimulatedSource::new();
        source
            .start_updates(&StreamProfile::default(), Arc::new(|_| {}))
            .unwrap();
        let err = source
            .start_updates(&StreamProfile::default(), Arc::new(|_| {}))
            .unwrap_err();
        assert_eq!(err, SourceError::AlreadyStreaming);
    }

    #[test]
    fn test_sequential_resubscription() {
        let mut source = SimulatedSource::new();
        for _ in 0..3 {
            source
                .start_updates(&StreamProfile::default(), Arc::new(|_| {}))
                .unwrap();
            source.stop_updates().unwrap();
        }
        assert_eq!(source.start_count(), 3);
        assert_eq!(source.stop_count(), 3);
    }

    #[test]
    fn test_emit_fix_reaches_stream_sink() {
        let mut source = SimulatedSource::new();
        let received = Arc::new(AtomicU32::new(0));
        let sink_received = received.clone();
        source
            .start_updates(
                &StreamProfile::default(),
                Arc::new(move |_| {
                    sink_received.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        assert!(source.emit_fix(fix_at(1.0, 2.0, 100)));
        assert_eq!(received.load(Ordering::SeqCst), 1);

        source.stop_updates().unwrap();
        assert!(!source.emit_fix(fix_at(1.0, 2.0, 200)));
    }

    #[test]
    fn test_one_shot_resolution() {
        let mut source = SimulatedSource::new();
        let received = Arc::new(AtomicU32::new(0));
        let sink_received = received.clone();
        source
            .request_fix(Arc::new(move |_| {
                sink_received.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        assert!(source.one_shot_pending());

        assert!(source.resolve_one_shot(fix_at(1.0, 2.0, 100)));
        assert_eq!(received.load(Ordering::SeqCst), 1);
        assert!(!source.one_shot_pending());
    }

    #[test]
    fn test_cancel_drops_pending_request() {
        let mut source = SimulatedSource::new();
        source.request_fix(Arc::new(|_| {})).unwrap();
        source.cancel_request().unwrap();
        assert_eq!(source.cancel_count(), 1);
        assert!(!source.one_shot_pending());
        assert!(!source.resolve_one_shot(fix_at(0.0, 0.0, 1)));

        // Cancelling with nothing pending is a no-op.
        source.cancel_request().unwrap();
        assert_eq!(source.cancel_count(), 1);
    }

    #[test]
    fn test_best_effort_cancel_keeps_sink() {
        let mut source = SimulatedSource::new();
        source.set_best_effort_cancel(true);
        source.request_fix(Arc::new(|_| {})).unwrap();
        source.cancel_request().unwrap();
        assert_eq!(source.cancel_count(), 1);
        // The delivery can still race in after cancellation.
        assert!(source.one_shot_pending());
    }

    #[test]
    fn test_permission_denied() {
        let mut source = SimulatedSource::new();
        source.set_permission_denied(true);
        let err = source
            .start_updates(&StreamProfile::default(), Arc::new(|_| {}))
            .unwrap_err();
        assert_eq!(err, SourceError::PermissionDenied);
        let err = source.request_fix(Arc::new(|_| {})).unwrap_err();
        assert_eq!(err, SourceError::PermissionDenied);
    }

    #[test]
    fn test_hardware_disabled() {
        let mut source = SimulatedSource::new();
        source.set_hardware_enabled(false);
        let err = source.request_fix(Arc::new(|_| {})).unwrap_err();
        assert_eq!(err, SourceError::HardwareDisabled);
    }

    #[test]
    fn test_error_simulation() {
        let mut source = SimulatedSource::new();
        source.simulate_errors(true, 1.0);
        let err = source.request_fix(Arc::new(|_| {})).unwrap_err();
        assert!(matches!(err, SourceError::Backend { .. }));
    }
}
