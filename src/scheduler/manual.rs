//! Deterministic scheduler driven by hand.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use super::queue::{FrameQueue, fire_due_timers, run_frame_batch};
use super::{
    FrameCallback, FrameHandle, FrameReport, FrameScheduler, Timer, TimerCallback, TimerHandle,
};

/// Scheduler whose frames and clock only move when told to.
///
/// Clones share the same queue and clock, so a test can hand one clone to a
/// handler and keep another to drive it.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<FrameQueue>>,
    now: Rc<Cell<Duration>>,
}

impl ManualScheduler {
    /// Creates a scheduler at virtual time zero with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one frame: every callback pending when the tick starts.
    pub fn tick(&self) -> FrameReport {
        run_frame_batch(&self.queue)
    }

    /// Moves the virtual clock forward and fires timers that became due.
    pub fn advance(&self, by: Duration) -> FrameReport {
        let now = self.now.get().saturating_add(by);
        self.now.set(now);
        fire_due_timers(&self.queue, now)
    }

    /// Alternates frames and clock steps until `total` has elapsed.
    ///
    /// Each step runs a frame and then advances by `frame_interval`, so a
    /// timer expiring mid-way stops frames from the following step onwards.
    /// A zero `frame_interval` is treated as one millisecond.
    pub fn run_for(&self, total: Duration, frame_interval: Duration) -> FrameReport {
        let step = frame_interval.max(Duration::from_millis(1));
        let target = self.now.get().saturating_add(total);
        let mut report = FrameReport::default();
        while self.now.get() < target {
            report.absorb(self.tick());
            let remaining = target.saturating_sub(self.now.get());
            report.absorb(self.advance(step.min(remaining)));
        }
        report
    }

    /// Virtual time elapsed since construction.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.now.get()
    }

    /// Number of frames waiting for the next tick.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.queue.borrow().pending_frames()
    }

    /// Number of timers that have not fired yet.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.queue.borrow().pending_timers()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        self.queue.borrow_mut().push_frame(callback)
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let removed = self.queue.borrow_mut().cancel_frame(handle);
        trace!(frame = handle.id(), removed, "cancel frame");
    }
}

impl Timer for ManualScheduler {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let deadline = self.now.get().saturating_add(delay);
        self.queue.borrow_mut().push_timer(deadline, callback)
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        let removed = self.queue.borrow_mut().cancel_timer(handle);
        trace!(timer = handle.id(), removed, "clear timer");
    }
}
