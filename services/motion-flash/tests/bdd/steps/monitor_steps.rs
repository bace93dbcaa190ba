//! BDD step definitions for monitor poll cycle feature

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};

use motion_flash::error::PollError;
use motion_flash::state::Diagnostic;
use motion_flash::status::{RoomId, RoomStatus};

use crate::world::{Edge, MotionFlashWorld, RecordingActuator};

const INTERVAL: Duration = Duration::from_secs(2);

/// Parse "1=false, 2=true" into rooms named "Room <id>"
fn parse_rooms(list: &str) -> Vec<RoomStatus> {
    list.split(',')
        .map(|entry| {
            let (id, motion) = entry
                .trim()
                .split_once('=')
                .unwrap_or_else(|| panic!("expected id=bool, got '{}'", entry));
            let motion: bool = motion.trim().parse().expect("motion must be true or false");
            RoomStatus::new(id.trim(), format!("Room {}", id.trim()), motion)
        })
        .collect()
}

#[given(expr = "the status API returns rooms {string}")]
fn api_returns_rooms(world: &mut MotionFlashWorld, rooms: String) {
    world.script.push(Ok(parse_rooms(&rooms)));
}

#[given("the status API reports a logical failure")]
fn api_logical_failure(world: &mut MotionFlashWorld) {
    world.script.push(Err(PollError::ApiLogical(None)));
}

#[given(expr = "the status API is unreachable {int} time(s)")]
fn api_unreachable(world: &mut MotionFlashWorld, times: usize) {
    for _ in 0..times {
        world
            .script
            .push(Err(PollError::Connection("connection refused".to_string())));
    }
}

#[given("the status API times out")]
fn api_times_out(world: &mut MotionFlashWorld) {
    world.script.push(Err(PollError::Timeout));
}

#[given("the flash actuator is broken")]
fn actuator_broken(world: &mut MotionFlashWorld) {
    world.actuator = Some(Arc::new(RecordingActuator::failing()));
}

#[when(expr = "the monitor polls {int} time(s)")]
async fn monitor_polls(world: &mut MotionFlashWorld, times: usize) {
    for _ in 0..times {
        let report = world.monitor(INTERVAL).poll_once().await;
        world.reports.push(report);
    }
}

fn report(world: &MotionFlashWorld, poll: usize) -> &motion_flash::monitor::CycleReport {
    world
        .reports
        .get(poll - 1)
        .unwrap_or_else(|| panic!("poll {} never ran", poll))
}

#[then(expr = "poll {int} should trigger no rooms")]
fn poll_triggers_nothing(world: &mut MotionFlashWorld, poll: usize) {
    let report = report(world, poll);
    assert!(
        report.triggered.is_empty(),
        "poll {} triggered {:?}",
        poll,
        report.triggered
    );
    assert!(!report.flashed);
}

#[then(expr = "poll {int} should trigger rooms {string}")]
fn poll_triggers_rooms(world: &mut MotionFlashWorld, poll: usize, names: String) {
    let expected: Vec<String> = names.split(',').map(|n| n.trim().to_string()).collect();
    let report = report(world, poll);
    assert_eq!(report.triggered, expected);
}

#[then(expr = "poll {int} should have flashed")]
fn poll_flashed(world: &mut MotionFlashWorld, poll: usize) {
    assert!(report(world, poll).flashed, "poll {} did not flash", poll);
}

#[then(expr = "poll {int} should not have flashed")]
fn poll_not_flashed(world: &mut MotionFlashWorld, poll: usize) {
    assert!(!report(world, poll).flashed, "poll {} flashed", poll);
}

#[then(expr = "the session should count {int} flash(es)")]
fn session_flashes(world: &mut MotionFlashWorld, expected: u64) {
    let monitor = world.monitor.as_ref().expect("monitor never ran");
    assert_eq!(monitor.session().flashes(), expected);
}

#[then(expr = "poll {int} should report {string}")]
fn poll_reports(world: &mut MotionFlashWorld, poll: usize, message: String) {
    let diagnostic = report(world, poll)
        .diagnostic
        .as_ref()
        .unwrap_or_else(|| panic!("poll {} reported nothing", poll));
    assert!(
        diagnostic.to_string().contains(&message),
        "expected '{}' in '{}'",
        message,
        diagnostic
    );
}

#[then(expr = "the actuator should have flashed {int} time(s)")]
async fn actuator_flashed(world: &mut MotionFlashWorld, expected: usize) {
    assert_eq!(world.actuator().count(Edge::Assert).await, expected);
}

#[then(expr = "{int} connection diagnostic(s) should have been reported")]
fn connection_diagnostics(world: &mut MotionFlashWorld, expected: usize) {
    let count = world
        .reports
        .iter()
        .filter(|r| matches!(r.diagnostic, Some(Diagnostic::CannotConnect { .. })))
        .count();
    assert_eq!(count, expected);
}

#[then(expr = "room {string} should be stored without motion")]
fn room_stored_without_motion(world: &mut MotionFlashWorld, id: String) {
    let monitor = world.monitor.as_ref().expect("monitor never ran");
    assert_eq!(monitor.detector().last_state(&RoomId(id)), Some(false));
}

#[then(expr = "the consecutive error count should be {int}")]
fn consecutive_errors(world: &mut MotionFlashWorld, expected: u32) {
    let monitor = world.monitor.as_ref().expect("monitor never ran");
    assert_eq!(monitor.session().consecutive_errors(), expected);
}

#[then("the last successful poll time should be recorded")]
fn last_success_recorded(world: &mut MotionFlashWorld) {
    let monitor = world.monitor.as_ref().expect("monitor never ran");
    assert!(monitor.session().last_successful_poll().is_some());
}
