//! Fixed-rate frame clock running on tokio's timer.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, trace};

use super::queue::{FrameQueue, fire_due_timers, run_frame_batch};
use super::{
    FrameCallback, FrameHandle, FrameReport, FrameScheduler, Timer, TimerCallback, TimerHandle,
};

/// Frame scheduler that emits one frame every `frame_interval`.
///
/// The ticker is single-threaded: callbacks run inside
/// [`FrameTicker::run_until_idle`] on the task that awaits it. Clones share
/// the same queue.
#[derive(Clone, Debug)]
pub struct FrameTicker {
    queue: Rc<RefCell<FrameQueue>>,
    origin: Instant,
    frame_interval: Duration,
}

impl FrameTicker {
    /// Creates a ticker whose clock starts now. A zero interval is raised to
    /// one millisecond.
    #[must_use]
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            queue: Rc::default(),
            origin: Instant::now(),
            frame_interval: frame_interval.max(Duration::from_millis(1)),
        }
    }

    /// Period between frames.
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Drives frames and timers until nothing is pending.
    ///
    /// On every tick due timers fire first and then the pending frame batch
    /// runs, so a loop whose duration has elapsed does not get one more copy.
    pub async fn run_until_idle(&self) -> FrameReport {
        let mut ticks = interval(self.frame_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut report = FrameReport::default();
        while !self.is_idle() {
            ticks.tick().await;
            report.absorb(fire_due_timers(&self.queue, self.origin.elapsed()));
            report.absorb(run_frame_batch(&self.queue));
        }
        debug!(
            frames = report.frames_run,
            timers = report.timers_fired,
            failures = report.errors.len(),
            "frame ticker idle"
        );
        report
    }

    fn is_idle(&self) -> bool {
        self.queue.borrow().is_idle()
    }
}

impl FrameScheduler for FrameTicker {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        self.queue.borrow_mut().push_frame(callback)
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let removed = self.queue.borrow_mut().cancel_frame(handle);
        trace!(frame = handle.id(), removed, "cancel frame");
    }
}

impl Timer for FrameTicker {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let deadline = self.origin.elapsed().saturating_add(delay);
        self.queue.borrow_mut().push_timer(deadline, callback)
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        let removed = self.queue.borrow_mut().cancel_timer(handle);
        trace!(timer = handle.id(), removed, "clear timer");
    }
}
