//! BDD step definitions for monitor lifecycle feature

use std::time::Duration;

use cucumber::{then, when};
use tokio_util::sync::CancellationToken;

use crate::world::MotionFlashWorld;

#[when(expr = "the monitor runs with a {int} ms interval and is cancelled after {int} ms")]
async fn monitor_runs_and_cancels(world: &mut MotionFlashWorld, interval_ms: u64, after_ms: u64) {
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(after_ms)).await;
        cancel_clone.cancel();
    });

    world
        .monitor(Duration::from_millis(interval_ms))
        .run(cancel)
        .await;
}

#[when("the monitor runs after it was already cancelled")]
async fn monitor_runs_cancelled(world: &mut MotionFlashWorld) {
    let cancel = CancellationToken::new();
    cancel.cancel();
    world.monitor(Duration::from_secs(2)).run(cancel).await;
}

#[then(expr = "the monitor should be {word}")]
fn monitor_phase(world: &mut MotionFlashWorld, phase: String) {
    let monitor = world.monitor.as_ref().expect("monitor never built");
    assert_eq!(monitor.phase().to_string(), phase);
}

#[then(expr = "the status API should have been polled at least {int} time(s)")]
async fn polled_at_least(world: &mut MotionFlashWorld, expected: usize) {
    let source = world.source.as_ref().expect("source never built");
    let fetches = *source.fetches.read().await;
    assert!(fetches >= expected, "only {} fetches", fetches);
}

#[then("the status API should not have been polled")]
async fn never_polled(world: &mut MotionFlashWorld) {
    let source = world.source.as_ref().expect("source never built");
    assert_eq!(*source.fetches.read().await, 0);
}
