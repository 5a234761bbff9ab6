//! BDD step definitions for sync handler behaviour.

use std::time::Duration;

use rstest_bdd_macros::{given, then, when};
use tether::test_support::RecordingTarget;

use super::test_helpers::HandlerWorld;

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a handler that runs for {millis:u64} milliseconds")]
fn handler_with_duration(handler_world: &HandlerWorld, millis: u64) {
    handler_world.install_handler(Duration::from_millis(millis));
}

#[given("targets \"{first}\" and \"{second}\" are registered")]
fn targets_registered(handler_world: &HandlerWorld, first: String, second: String) {
    let first_target = RecordingTarget::new(first.trim(), &handler_world.log);
    let second_target = RecordingTarget::new(second.trim(), &handler_world.log);
    handler_world.with_handler(|handler| {
        handler.to(first_target.clone()).to(second_target.clone());
    });
    handler_world
        .targets
        .borrow_mut()
        .extend([first_target, second_target]);
}

#[when("the trigger for a source reading {reading:u64} is invoked")]
fn invoke_trigger(handler_world: &HandlerWorld, reading: u64) {
    handler_world.with_handler(|handler| handler.from(reading).invoke());
}

#[when("one frame elapses")]
fn one_frame(handler_world: &HandlerWorld) -> Result<(), StepError> {
    let report = handler_world.scheduler.tick();
    if report.is_clean() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "frame failed: {:?}",
            report.errors
        )))
    }
}

#[when("{millis:u64} milliseconds elapse")]
fn time_elapses(handler_world: &HandlerWorld, millis: u64) {
    handler_world
        .scheduler
        .advance(Duration::from_millis(millis));
}

#[when("the loop is freed")]
fn loop_freed(handler_world: &HandlerWorld) {
    handler_world.with_handler(|handler| handler.free_loop());
}

#[then("target \"{name}\" holds {expected:u64}")]
fn target_holds(
    handler_world: &HandlerWorld,
    name: String,
    expected: u64,
) -> Result<(), StepError> {
    let target = handler_world.target(name.trim());
    match target.value() {
        Some(value) if value == expected => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected {name} to hold {expected}, got {other:?}"
        ))),
    }
}

#[then("target \"{first}\" was written before target \"{second}\"")]
fn written_in_order(
    handler_world: &HandlerWorld,
    first: String,
    second: String,
) -> Result<(), StepError> {
    let entries = handler_world.log.entries();
    let position = |name: &str| entries.iter().position(|entry| entry.target == name);
    match (position(first.trim()), position(second.trim())) {
        (Some(a), Some(b)) if a < b => Ok(()),
        positions => Err(StepError::Assertion(format!(
            "expected {first} before {second}, positions {positions:?} in {entries:?}"
        ))),
    }
}

#[then("the handler is idle")]
fn handler_idle(handler_world: &HandlerWorld) -> Result<(), StepError> {
    if handler_world.with_handler(|handler| handler.is_running()) {
        Err(StepError::Assertion(String::from(
            "expected the handler to be idle",
        )))
    } else {
        Ok(())
    }
}

#[then("no frame is pending")]
fn no_frame_pending(handler_world: &HandlerWorld) {
    assert_eq!(handler_world.scheduler.pending_frames(), 0);
}

#[then("exactly {count:u32} frame is pending")]
fn frames_pending(handler_world: &HandlerWorld, count: u32) {
    assert_eq!(handler_world.scheduler.pending_frames(), count as usize);
}
