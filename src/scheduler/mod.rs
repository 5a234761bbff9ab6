//! Frame and timer scheduling seams used by the sync loop.
//!
//! A [`crate::handler::SyncHandler`] never decides on its own when the next
//! frame happens. It asks a [`FrameScheduler`] for one and arms a [`Timer`]
//! that ends the loop. Two implementations ship with the crate: the
//! deterministic [`ManualScheduler`] used by tests and the tokio-driven
//! [`FrameTicker`] used by the binary.

use std::time::Duration;

use crate::handler::SyncError;

mod manual;
mod queue;
mod ticker;

pub use manual::ManualScheduler;
pub use ticker::FrameTicker;

/// Callback run at the next frame boundary.
///
/// Returning an error tells the scheduler the frame failed. The built-in
/// schedulers log and record the failure and never run that callback again.
pub type FrameCallback = Box<dyn FnOnce() -> Result<(), SyncError>>;

/// One-shot callback run when a timer expires.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Opaque identifier for a requested frame.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Returns the numeric identifier, mostly useful for logging.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Opaque identifier for an armed timer.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Returns the numeric identifier, mostly useful for logging.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Schedules callbacks to run once per frame.
pub trait FrameScheduler {
    /// Queues `callback` for the next frame and returns a cancellable handle.
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Removes a pending frame. Unknown or already-run handles are ignored.
    fn cancel_frame(&self, handle: FrameHandle);
}

/// One-shot delayed callbacks.
pub trait Timer {
    /// Runs `callback` once `delay` has elapsed on the scheduler's clock and
    /// returns a handle that can disarm it.
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Disarms a pending timer. Unknown or already-fired handles are ignored.
    fn clear_timeout(&self, handle: TimerHandle);
}

/// Summary of the work a scheduler performed while being driven.
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Number of frame callbacks invoked.
    pub frames_run: usize,
    /// Number of timers that fired.
    pub timers_fired: usize,
    /// Failures returned by frame callbacks, in the order they happened.
    pub errors: Vec<SyncError>,
}

impl FrameReport {
    /// Folds another report into this one.
    pub fn absorb(&mut self, other: Self) {
        self.frames_run += other.frames_run;
        self.timers_fired += other.timers_fired;
        self.errors.extend(other.errors);
    }

    /// Returns `true` when no frame callback failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
