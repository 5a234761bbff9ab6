//! BDD scenarios for the sync handler loop.

use rstest_bdd_macros::scenario;

use super::test_helpers::{HandlerWorld, handler_world};

#[scenario(
    path = "tests/features/sync_handler.feature",
    name = "Copy the source value into every target on each frame"
)]
fn scenario_copy_each_frame(handler_world: HandlerWorld) {
    let _ = handler_world;
}

#[scenario(
    path = "tests/features/sync_handler.feature",
    name = "Stop the loop once the duration elapses"
)]
fn scenario_stop_after_duration(handler_world: HandlerWorld) {
    let _ = handler_world;
}

#[scenario(
    path = "tests/features/sync_handler.feature",
    name = "Rebinding the source mid-loop keeps a single frame chain"
)]
fn scenario_rebind_mid_loop(handler_world: HandlerWorld) {
    let _ = handler_world;
}

#[scenario(
    path = "tests/features/sync_handler.feature",
    name = "Freeing an idle handler changes nothing"
)]
fn scenario_free_idle(handler_world: HandlerWorld) {
    let _ = handler_world;
}
