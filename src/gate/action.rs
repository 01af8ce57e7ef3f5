//! Proximity-gated user actions
//!
//! Wraps an arbitrary commit callback (submit review, mark visited, confirm
//! placement) so it can only execute while the user is inside the allowed
//! zone. The verdict shown by the UI may be seconds old by the time the user
//! presses the button, so the gate re-evaluates synchronously against the fix
//! held at the instant of commit — re-validation at commit time is mandatory,
//! not optional.

use crate::core::types::{Coordinate, Fix};
use crate::gate::{evaluate, ProximityVerdict, RadiusPolicy};
use crate::tracker::{LocationTracker, ObserverHandle};
use std::sync::{Arc, Mutex};

/// Gate state as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionState {
    /// No fix has arrived yet; the action is disabled
    ///
    /// May persist indefinitely (e.g. permission denied). This is "no verdict
    /// available", not an error.
    AwaitingFix,
    /// A fix is held; the verdict is recomputed on every update
    Evaluated(ProximityVerdict),
}

/// Why a commit attempt was rejected locally
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    /// No fix was available at the moment of commit
    NoFix,
    /// The held fix was outside the zone; margin is negative
    OutOfZone { margin_m: f64 },
}

/// Result of one commit attempt
///
/// Always a typed outcome, never an error. The wrapper does not retry; a
/// retry is the caller's decision after observing the outcome.
#[derive(Debug)]
pub enum CommitOutcome<R> {
    /// The wrapped action ran and produced `R`
    Committed(R),
    /// The wrapped action was not invoked
    Rejected(RejectReason),
}

/// Record of the most recent commit attempt, without the action's result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttemptOutcome {
    Committed,
    Rejected(RejectReason),
}

/// A user action admissible only inside the proximity zone
pub struct ProximityGatedAction<R> {
    target: Coordinate,
    policy: RadiusPolicy,
    current_fix: Option<Fix>,
    commit_fn: Box<dyn FnMut() -> R + Send>,
    last_outcome: Option<AttemptOutcome>,
}

impl<R> ProximityGatedAction<R> {
    /// Wrap `commit_fn` behind zone verification against `target`
    pub fn new<F>(target: Coordinate, policy: RadiusPolicy, commit_fn: F) -> Self
    where
        F: FnMut() -> R + Send + 'static,
    {
        Self {
            target,
            policy,
            current_fix: None,
            commit_fn: Box::new(commit_fn),
            last_outcome: None,
        }
    }

    /// Feed a new fix; the verdict is recomputed from it on demand
    ///
    /// A fix with an older production timestamp than the one already held is
    /// discarded, so a delayed delivery cannot roll the gate back to a stale
    /// position.
    pub fn update_fix(&mut self, fix: Fix) {
        if let Some(held) = &self.current_fix {
            if fix.timestamp_ms < held.timestamp_ms {
                return;
            }
        }
        self.current_fix = Some(fix);
    }

    /// Current gate state for rendering
    pub fn state(&self) -> ActionState {
        match &self.current_fix {
            None => ActionState::AwaitingFix,
            Some(fix) => ActionState::Evaluated(evaluate(fix, self.target, self.policy)),
        }
    }

    /// Current verdict, if a fix is held
    pub fn verdict(&self) -> Option<ProximityVerdict> {
        match self.state() {
            ActionState::AwaitingFix => None,
            ActionState::Evaluated(verdict) => Some(verdict),
        }
    }

    /// Attempt to commit the wrapped action
    ///
    /// Re-runs the zone evaluation against the fix held at this instant.
    /// Inside the zone the wrapped callback fires exactly once for this
    /// attempt; outside, the attempt is rejected locally and the callback is
    /// not invoked.
    pub fn commit(&mut self) -> CommitOutcome<R> {
        let fix = match &self.current_fix {
            None => {
                self.last_outcome = Some(AttemptOutcome::Rejected(RejectReason::NoFix));
                return CommitOutcome::Rejected(RejectReason::NoFix);
            }
            Some(fix) => *fix,
        };

        let verdict = evaluate(&fix, self.target, self.policy);
        if !verdict.within_zone {
            let reason = RejectReason::OutOfZone {
                margin_m: verdict.margin_m,
            };
            self.last_outcome = Some(AttemptOutcome::Rejected(reason));
            return CommitOutcome::Rejected(reason);
        }

        let result = (self.commit_fn)();
        self.last_outcome = Some(AttemptOutcome::Committed);
        CommitOutcome::Committed(result)
    }

    /// Outcome of the most recent commit attempt, if any
    pub fn last_outcome(&self) -> Option<AttemptOutcome> {
        self.last_outcome
    }

    pub fn target(&self) -> Coordinate {
        self.target
    }

    pub fn policy(&self) -> RadiusPolicy {
        self.policy
    }
}

/// Subscribe a shared gated action to a tracker's fix stream
///
/// Every stored fix, including the replayed latest value, flows into
/// `update_fix`. Detach with `LocationTracker::unobserve`.
pub fn attach<R: Send + 'static>(
    tracker: &LocationTracker,
    action: Arc<Mutex<ProximityGatedAction<R>>>,
) -> ObserverHandle {
    tracker.observe_fixes(Arc::new(move |fix| {
        action
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .update_fix(fix);
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SimulatedSource, StreamProfile};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn target() -> Coordinate {
        Coordinate::new(47.0, 8.0)
    }

    /// Offset north of the target by approximately `meters`
    fn fix_meters_north(meters: f64, timestamp_ms: u64) -> Fix {
        let dlat = meters / 111_195.0;
        Fix::new(Coordinate::new(47.0 + dlat, 8.0), timestamp_ms)
    }

    fn counting_action(counter: Arc<AtomicU32>) -> ProximityGatedAction<&'static str> {
        ProximityGatedAction::new(target(), RadiusPolicy::new(50.0), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "submitted"
        })
    }

    #[test]
    fn test_awaiting_fix_until_first_update() {
        let action = counting_action(Arc::new(AtomicU32::new(0)));
        assert_eq!(action.state(), ActionState::AwaitingFix);
        assert!(action.verdict().is_none());
    }

    #[test]
    fn test_commit_without_fix_is_rejected() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut action = counting_action(calls.clone());

        let outcome = action.commit();
        assert!(matches!(
            outcome,
            CommitOutcome::Rejected(RejectReason::NoFix)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            action.last_outcome(),
            Some(AttemptOutcome::Rejected(RejectReason::NoFix))
        );
    }

    #[test]
    fn test_commit_inside_zone_fires_exactly_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut action = counting_action(calls.clone());

        action.update_fix(fix_meters_north(45.0, 100));
        let outcome = action.commit();
        assert!(matches!(outcome, CommitOutcome::Committed("submitted")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(action.last_outcome(), Some(AttemptOutcome::Committed));
    }

    #[test]
    fn test_revalidation_at_commit_time() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut action = counting_action(calls.clone());

        // Inside the zone: first commit goes through.
        action.update_fix(fix_meters_north(45.0, 100));
        assert!(matches!(action.commit(), CommitOutcome::Committed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The user drifts out before pressing again. The button may still
        // render as enabled from the old verdict; the commit must not.
        action.update_fix(fix_meters_north(60.0, 200));
        match action.commit() {
            CommitOutcome::Rejected(RejectReason::OutOfZone { margin_m }) => {
                assert!((margin_m - (-10.0)).abs() < 0.5);
            }
            other => panic!("expected OutOfZone rejection, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_fix_update_is_discarded() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut action = counting_action(calls.clone());

        // The user walked out of the zone; a delayed delivery of an older
        // inside-zone fix must not re-arm the gate.
        action.update_fix(fix_meters_north(60.0, 200));
        action.update_fix(fix_meters_north(45.0, 100));

        assert!(matches!(
            action.commit(),
            CommitOutcome::Rejected(RejectReason::OutOfZone { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_verdict_tracks_fix_updates() {
        let mut action = counting_action(Arc::new(AtomicU32::new(0)));

        action.update_fix(fix_meters_north(45.0, 100));
        let verdict = action.verdict().unwrap();
        assert!(verdict.within_zone);
        assert!((verdict.margin_m - 5.0).abs() < 0.5);

        action.update_fix(fix_meters_north(60.0, 200));
        let verdict = action.verdict().unwrap();
        assert!(!verdict.within_zone);
        assert!((verdict.margin_m - (-10.0)).abs() < 0.5);
    }

    #[test]
    fn test_attach_feeds_tracker_fixes_into_action() {
        let source = SimulatedSource::new();
        let tracker =
            LocationTracker::new(Box::new(source.clone()), StreamProfile::default());
        let _handle = tracker.acquire();

        let calls = Arc::new(AtomicU32::new(0));
        let action = Arc::new(Mutex::new(counting_action(calls.clone())));
        attach(&tracker, action.clone());

        source.emit_fix(fix_meters_north(45.0, 100));
        let outcome = action.lock().unwrap().commit();
        assert!(matches!(outcome, CommitOutcome::Committed(_)));

        source.emit_fix(fix_meters_north(60.0, 200));
        let outcome = action.lock().unwrap().commit();
        assert!(matches!(
            outcome,
            CommitOutcome::Rejected(RejectReason::OutOfZone { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
