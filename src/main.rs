//! Demonstration of shared location tracking and proximity-gated actions
//!
//! Simulates a user walking toward a spot while two screens share one
//! tracker: a map screen that only observes fixes, and a review screen that
//! commits a proximity-gated action once the user is inside the zone.

use log::info;
use proximity::{
    attach, AppConfig, CommitOutcome, Coordinate, Fix, LocationTracker, ProximityGatedAction,
    RejectReason, SimulatedSource, TrackerEvent,
};
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Meters of latitude per degree on the mean-radius sphere
const METERS_PER_DEGREE: f64 = 111_195.0;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn main() {
    env_logger::init();

    let config = AppConfig::default();
    let spot = Coordinate::new(47.3769, 8.5417);

    let source = SimulatedSource::new();
    let tracker = LocationTracker::new(Box::new(source.clone()), config.stream);

    tracker.observe_events(Arc::new(|event: TrackerEvent| {
        info!("tracker event: {:?}", event);
    }));

    // Map screen: just watches the shared stream.
    let map_screen = tracker.acquire();
    tracker.observe_fixes(Arc::new(|fix: Fix| {
        info!(
            "map update: {:.5}, {:.5} (accuracy {:?} m)",
            fix.coordinate.lat, fix.coordinate.lon, fix.accuracy_m
        );
    }));

    // Review screen: proximity-gated submission against the spot.
    let review_screen = tracker.acquire();
    let review = Arc::new(Mutex::new(ProximityGatedAction::new(
        spot,
        config.review_policy(),
        || {
            println!(">>> review submitted");
            true
        },
    )));
    attach(&tracker, review.clone());

    println!(
        "Walking toward the spot at {:.4}, {:.4} (zone radius {} m)",
        spot.lat, spot.lon, config.review_radius_m
    );

    // Walk in from 300 m south in jittered 40 m steps, resolving the initial
    // one-shot first the way a platform engine would.
    let mut rng = rand::thread_rng();
    let mut distance_m = 300.0;
    source.resolve_one_shot(walk_fix(spot, distance_m, &mut rng));

    for _ in 0..10 {
        thread::sleep(Duration::from_millis(200));
        distance_m = (distance_m - 40.0 + rng.gen_range(-5.0..5.0)).max(0.0);
        source.emit_fix(walk_fix(spot, distance_m, &mut rng));

        let mut review = review.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(verdict) = review.verdict() {
            if verdict.within_zone {
                println!(
                    "inside zone ({:.0} m away, {:.0} m of margin), committing",
                    verdict.distance_m, verdict.margin_m
                );
                match review.commit() {
                    CommitOutcome::Committed(_) => break,
                    CommitOutcome::Rejected(RejectReason::OutOfZone { margin_m }) => {
                        println!("rejected at commit time, move closer by {:.0} m", -margin_m);
                    }
                    CommitOutcome::Rejected(RejectReason::NoFix) => {
                        println!("rejected: no fix available");
                    }
                }
            } else {
                println!("move closer, {:.0} m to go", -verdict.margin_m);
            }
        }
    }

    tracker.release(review_screen);
    tracker.release(map_screen);

    let snapshot = tracker.snapshot();
    println!(
        "done: {} fixes received, {} discarded, stream started {} time(s), stopped {} time(s)",
        snapshot.fixes_received,
        snapshot.fixes_discarded,
        snapshot.stream_starts,
        snapshot.stream_stops
    );
}

/// A fix `distance_m` south of `spot` with a little longitudinal jitter
fn walk_fix(spot: Coordinate, distance_m: f64, rng: &mut impl Rng) -> Fix {
    let lat = spot.lat - distance_m / METERS_PER_DEGREE;
    let lon = spot.lon + rng.gen_range(-2.0..2.0) / METERS_PER_DEGREE;
    Fix::new(Coordinate::new(lat, lon), now_ms()).with_accuracy(5.0)
}
