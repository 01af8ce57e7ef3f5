//! Reference-counted location subscription manager
//!
//! Multiplexes any number of interested callers onto a single continuous
//! subscription to the underlying location source. The first `acquire`
//! starts the hardware stream and issues a cancellable one-shot fix request;
//! the last `release` stops the stream and cancels the one-shot if still
//! outstanding. The latest fix is republished to registered observers as a
//! hot latest-value stream.

use crate::core::types::Fix;
use crate::source::{FixSink, LocationSource, SourceError, StreamProfile};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Opaque token identifying one caller's interest in tracking
///
/// Created by `LocationTracker::acquire` and consumed by `release`. Releasing
/// the same handle twice is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Handle identifying a registered fix or event observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

/// Callback receiving republished fixes
pub type FixObserver = Arc<dyn Fn(Fix) + Send + Sync>;

/// Callback receiving advisory tracker events
pub type EventObserver = Arc<dyn Fn(TrackerEvent) + Send + Sync>;

/// Advisory events surfaced by the tracker
///
/// These are a read-only signal for optional UI display; tracker-internal
/// errors are absorbed into observable state, never thrown.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// The continuous stream was started
    StreamStarted,
    /// The continuous stream was stopped
    StreamStopped,
    /// The location source reported an error; acquisition still succeeded
    SourceError {
        context: &'static str,
        error: SourceError,
    },
    /// A fix older than the currently held one was discarded
    StaleFixDiscarded { timestamp_ms: u64 },
}

/// Cancellation token for an in-flight one-shot fix request
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of tracker state, for diagnostics and tests
#[derive(Debug, Clone)]
pub struct TrackerSnapshot {
    /// Number of currently registered subscribers
    pub subscriber_count: usize,
    /// Whether the continuous stream is active
    pub stream_active: bool,
    /// Whether a one-shot fix request is outstanding
    pub one_shot_pending: bool,
    /// The most recently stored fix
    pub latest_fix: Option<Fix>,
    /// Times the continuous stream was started
    pub stream_starts: u32,
    /// Times the continuous stream was stopped
    pub stream_stops: u32,
    /// Fixes accepted from the source
    pub fixes_received: u32,
    /// Fixes discarded as cancelled or stale
    pub fixes_discarded: u32,
    /// Source errors absorbed
    pub source_errors: u32,
}

#[derive(Debug, Default)]
struct TrackerStats {
    stream_starts: u32,
    stream_stops: u32,
    fixes_received: u32,
    fixes_discarded: u32,
    source_errors: u32,
}

struct TrackerInner {
    source: Box<dyn LocationSource>,
    profile: StreamProfile,
    subscribers: HashSet<u64>,
    fix_observers: HashMap<u64, FixObserver>,
    event_observers: HashMap<u64, EventObserver>,
    next_token: u64,
    pending_one_shot: Option<CancellationToken>,
    latest_fix: Option<Fix>,
    /// Sequence number assigned to `latest_fix` when it was stored
    latest_seq: u64,
    /// Monotone counter incremented for every stored fix
    fix_seq: u64,
    stream_active: bool,
    stats: TrackerStats,
}

struct Shared {
    state: Mutex<TrackerInner>,
    /// Sequence number of the most recently delivered fix
    ///
    /// Serializes observer delivery: sinks store under the state lock, drop
    /// it, then broadcast under this lock, so two deliveries racing on
    /// different platform threads cannot hand observers an older fix after a
    /// newer one. Never acquired while the state lock is held.
    delivered_seq: Mutex<u64>,
}

/// Shared location tracking component
///
/// One instance serves every screen that needs location. Construct it
/// explicitly and pass the reference to consumers; cloning shares the same
/// underlying state. All state mutation is serialized behind one mutex;
/// observer callbacks run after the lock is dropped and receive immutable
/// fix copies.
#[derive(Clone)]
pub struct LocationTracker {
    shared: Arc<Shared>,
}

impl LocationTracker {
    /// Create a tracker over the given location source
    pub fn new(source: Box<dyn LocationSource>, profile: StreamProfile) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(TrackerInner {
                    source,
                    profile,
                    subscribers: HashSet::new(),
                    fix_observers: HashMap::new(),
                    event_observers: HashMap::new(),
                    next_token: 1,
                    pending_one_shot: None,
                    latest_fix: None,
                    latest_seq: 0,
                    fix_seq: 0,
                    stream_active: false,
                    stats: TrackerStats::default(),
                }),
                delivered_seq: Mutex::new(0),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerInner> {
        self.shared.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register interest in location tracking
    ///
    /// Synchronous and never blocks. The first active subscriber starts the
    /// continuous stream and issues a cancellable one-shot request so it gets
    /// a fast initial value instead of waiting for the first periodic tick.
    /// Source failures are absorbed: they are logged, surfaced as
    /// `TrackerEvent::SourceError`, and the caller is still registered — it
    /// simply receives no fixes until the source becomes available.
    pub fn acquire(&self) -> SubscriptionHandle {
        let handle;
        let mut events = Vec::new();
        let listeners;
        {
            let mut inner = self.lock();
            let id = inner.next_token;
            inner.next_token += 1;
            inner.subscribers.insert(id);
            handle = SubscriptionHandle(id);

            if inner.subscribers.len() == 1 {
                Self::start_tracking(&self.shared, &mut inner, &mut events);
            }
            listeners = Self::event_listeners(&inner, &events);
        }
        Self::emit(&listeners, events);
        handle
    }

    /// Deregister interest
    ///
    /// Idempotent per handle: releasing an unknown or already-released handle
    /// is a no-op and never drives the subscriber count negative. When the
    /// last subscriber releases, the continuous stream stops and any pending
    /// one-shot request is cancelled.
    pub fn release(&self, handle: SubscriptionHandle) {
        let mut events = Vec::new();
        let listeners;
        {
            let mut inner = self.lock();
            if !inner.subscribers.remove(&handle.0) {
                debug!("release of unknown or already-released handle {:?}", handle);
                return;
            }
            if inner.subscribers.is_empty() {
                Self::stop_tracking(&mut inner, &mut events);
            }
            listeners = Self::event_listeners(&inner, &events);
        }
        Self::emit(&listeners, events);
    }

    /// The most recently stored fix, if any
    pub fn latest(&self) -> Option<Fix> {
        self.lock().latest_fix
    }

    /// Register a fix observer
    ///
    /// This is a hot latest-value stream: if a fix is already held, the
    /// observer receives it immediately, then every subsequently stored fix
    /// in production order.
    pub fn observe_fixes(&self, observer: FixObserver) -> ObserverHandle {
        let handle;
        let replay;
        {
            let mut inner = self.lock();
            let id = inner.next_token;
            inner.next_token += 1;
            inner.fix_observers.insert(id, observer.clone());
            replay = inner.latest_fix.map(|fix| (fix, inner.latest_seq));
            handle = ObserverHandle(id);
        }
        if let Some((fix, seq)) = replay {
            // Replay under the delivery cursor so it cannot interleave with a
            // concurrent broadcast of a newer fix. The cursor is not advanced:
            // a broadcast still in flight for this same sequence must reach
            // the observers that were registered before this one.
            let delivered = self
                .shared
                .delivered_seq
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if seq >= *delivered {
                observer(fix);
            }
        }
        handle
    }

    /// Register an observer for advisory tracker events
    pub fn observe_events(&self, observer: EventObserver) -> ObserverHandle {
        let mut inner = self.lock();
        let id = inner.next_token;
        inner.next_token += 1;
        inner.event_observers.insert(id, observer);
        ObserverHandle(id)
    }

    /// Remove a fix or event observer; unknown handles are ignored
    pub fn unobserve(&self, handle: ObserverHandle) {
        let mut inner = self.lock();
        inner.fix_observers.remove(&handle.0);
        inner.event_observers.remove(&handle.0);
    }

    /// Capture a point-in-time view of the tracker state
    pub fn snapshot(&self) -> TrackerSnapshot {
        let inner = self.lock();
        TrackerSnapshot {
            subscriber_count: inner.subscribers.len(),
            stream_active: inner.stream_active,
            one_shot_pending: inner.pending_one_shot.is_some(),
            latest_fix: inner.latest_fix,
            stream_starts: inner.stats.stream_starts,
            stream_stops: inner.stats.stream_stops,
            fixes_received: inner.stats.fixes_received,
            fixes_discarded: inner.stats.fixes_discarded,
            source_errors: inner.stats.source_errors,
        }
    }

    /// Start the continuous stream and issue the initial one-shot request
    ///
    /// Runs under the state lock on the 0 to 1 subscriber transition.
    fn start_tracking(
        shared: &Arc<Shared>,
        inner: &mut TrackerInner,
        events: &mut Vec<TrackerEvent>,
    ) {
        let stream_sink = Self::make_sink(shared, None);
        let profile = inner.profile;
        match inner.source.start_updates(&profile, stream_sink) {
            Ok(()) => {
                inner.stream_active = true;
                inner.stats.stream_starts += 1;
                events.push(TrackerEvent::StreamStarted);
                debug!("continuous location stream started");
            }
            Err(error) => {
                warn!("failed to start location stream: {}", error);
                inner.stats.source_errors += 1;
                events.push(TrackerEvent::SourceError {
                    context: "start_updates",
                    error,
                });
            }
        }

        let token = CancellationToken::new();
        let one_shot_sink = Self::make_sink(shared, Some(token.clone()));
        match inner.source.request_fix(one_shot_sink) {
            Ok(()) => {
                inner.pending_one_shot = Some(token);
                debug!("one-shot fix requested for first subscriber");
            }
            Err(error) => {
                warn!("one-shot fix request failed: {}", error);
                inner.stats.source_errors += 1;
                events.push(TrackerEvent::SourceError {
                    context: "request_fix",
                    error,
                });
            }
        }
    }

    /// Tear down the stream and cancel any pending one-shot
    ///
    /// Runs under the state lock on the 1 to 0 subscriber transition.
    fn stop_tracking(inner: &mut TrackerInner, events: &mut Vec<TrackerEvent>) {
        if let Some(token) = inner.pending_one_shot.take() {
            token.cancel();
            if let Err(error) = inner.source.cancel_request() {
                warn!("failed to cancel one-shot fix request: {}", error);
                inner.stats.source_errors += 1;
                events.push(TrackerEvent::SourceError {
                    context: "cancel_request",
                    error,
                });
            }
        }

        if inner.stream_active {
            if let Err(error) = inner.source.stop_updates() {
                warn!("failed to stop location stream: {}", error);
                inner.stats.source_errors += 1;
                events.push(TrackerEvent::SourceError {
                    context: "stop_updates",
                    error,
                });
            }
            // The stream is considered torn down either way; a later 0 to 1
            // transition starts a fresh one.
            inner.stream_active = false;
            inner.stats.stream_stops += 1;
            events.push(TrackerEvent::StreamStopped);
            debug!("continuous location stream stopped");
        }
    }

    /// Build the sink handed to the source for fix delivery
    ///
    /// The sink holds only a weak reference, so a source that outlives the
    /// tracker delivers into nothing. Ingestion is the only path that writes
    /// `latest_fix` and must stay cheap: it runs on whatever thread the
    /// platform delivers on.
    fn make_sink(shared: &Arc<Shared>, one_shot: Option<CancellationToken>) -> FixSink {
        let weak = Arc::downgrade(shared);
        Arc::new(move |fix: Fix| {
            let strong = match weak.upgrade() {
                Some(strong) => strong,
                None => return,
            };

            let mut seq = 0;
            let mut stored = false;
            let mut observers: Vec<FixObserver> = Vec::new();
            let mut events = Vec::new();
            let mut listeners: Vec<EventObserver> = Vec::new();
            {
                let mut inner = strong.state.lock().unwrap_or_else(|e| e.into_inner());

                if let Some(token) = &one_shot {
                    if token.is_cancelled() {
                        // Late result of a cancelled request. Discarding it is
                        // harmless; reviving the stream would not be.
                        inner.stats.fixes_discarded += 1;
                        debug!("discarding one-shot fix delivered after cancellation");
                        return;
                    }
                    inner.pending_one_shot = None;
                }

                inner.stats.fixes_received += 1;
                let stale = matches!(
                    inner.latest_fix,
                    Some(prev) if fix.timestamp_ms < prev.timestamp_ms
                );
                if stale {
                    // A one-shot result that arrives after a newer periodic
                    // fix loses: latest by production timestamp wins.
                    inner.stats.fixes_discarded += 1;
                    events.push(TrackerEvent::StaleFixDiscarded {
                        timestamp_ms: fix.timestamp_ms,
                    });
                    listeners = inner.event_observers.values().cloned().collect();
                } else {
                    inner.fix_seq += 1;
                    seq = inner.fix_seq;
                    inner.latest_fix = Some(fix);
                    inner.latest_seq = seq;
                    stored = true;
                    observers = inner.fix_observers.values().cloned().collect();
                }
            }

            // Broadcast outside the state lock, serialized by the delivery
            // cursor. A fix that lost the race to a newer delivery is dropped
            // rather than handed to observers out of order; `latest_fix`
            // already holds the newer value.
            if stored {
                let mut delivered = strong
                    .delivered_seq
                    .lock()
                    .unwrap_or_else(|e| e.into_inner());
                if seq > *delivered {
                    *delivered = seq;
                    for observer in &observers {
                        observer(fix);
                    }
                }
            }
            Self::emit(&listeners, events);
        })
    }

    fn event_listeners(inner: &TrackerInner, events: &[TrackerEvent]) -> Vec<EventObserver> {
        if events.is_empty() {
            Vec::new()
        } else {
            inner.event_observers.values().cloned().collect()
        }
    }

    fn emit(listeners: &[EventObserver], events: Vec<TrackerEvent>) {
        for event in events {
            for listener in listeners {
                listener(event.clone());
            }
        }
    }
}
