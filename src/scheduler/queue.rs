//! Pending frame and timer bookkeeping shared by the built-in schedulers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use tracing::warn;

use super::{FrameCallback, FrameHandle, FrameReport, TimerCallback, TimerHandle};

struct PendingFrame {
    handle: FrameHandle,
    callback: FrameCallback,
}

struct PendingTimer {
    deadline: Duration,
    sequence: u64,
    callback: TimerCallback,
}

/// Frames in request order plus timers keyed by deadline.
///
/// Deadlines are offsets from the owning scheduler's origin so the same
/// queue serves both the virtual clock and tokio's clock.
#[derive(Default)]
pub(super) struct FrameQueue {
    next_frame: u64,
    next_timer: u64,
    frames: VecDeque<PendingFrame>,
    timers: Vec<PendingTimer>,
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending_frames", &self.frames.len())
            .field("pending_timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

impl FrameQueue {
    pub(super) fn push_frame(&mut self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_frame);
        self.next_frame = self.next_frame.wrapping_add(1);
        self.frames.push_back(PendingFrame { handle, callback });
        handle
    }

    pub(super) fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        let Some(position) = self.frames.iter().position(|frame| frame.handle == handle) else {
            return false;
        };
        self.frames.remove(position).is_some()
    }

    /// Handle that the next requested frame will receive. Frames below it
    /// belong to the current batch.
    pub(super) const fn batch_boundary(&self) -> FrameHandle {
        FrameHandle(self.next_frame)
    }

    fn pop_frame_before(&mut self, boundary: FrameHandle) -> Option<PendingFrame> {
        if self.frames.front()?.handle < boundary {
            self.frames.pop_front()
        } else {
            None
        }
    }

    pub(super) fn push_timer(
        &mut self,
        deadline: Duration,
        callback: TimerCallback,
    ) -> TimerHandle {
        let sequence = self.next_timer;
        self.next_timer = self.next_timer.wrapping_add(1);
        self.timers.push(PendingTimer {
            deadline,
            sequence,
            callback,
        });
        TimerHandle(sequence)
    }

    pub(super) fn cancel_timer(&mut self, handle: TimerHandle) -> bool {
        let Some(position) = self
            .timers
            .iter()
            .position(|timer| timer.sequence == handle.0)
        else {
            return false;
        };
        drop(self.timers.swap_remove(position));
        true
    }

    fn pop_due_timer(&mut self, now: Duration) -> Option<TimerCallback> {
        let position = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= now)
            .min_by_key(|(_, timer)| (timer.deadline, timer.sequence))
            .map(|(position, _)| position)?;
        Some(self.timers.swap_remove(position).callback)
    }

    pub(super) fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub(super) fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub(super) fn is_idle(&self) -> bool {
        self.frames.is_empty() && self.timers.is_empty()
    }
}

/// Runs every frame that was pending when the batch started.
///
/// The queue is never borrowed while a callback runs, so callbacks are free
/// to request or cancel frames. Requests made during the batch land in the
/// next one.
pub(super) fn run_frame_batch(queue: &RefCell<FrameQueue>) -> FrameReport {
    let mut report = FrameReport::default();
    let boundary = queue.borrow().batch_boundary();
    loop {
        let next = queue.borrow_mut().pop_frame_before(boundary);
        let Some(frame) = next else {
            break;
        };
        report.frames_run += 1;
        if let Err(err) = (frame.callback)() {
            warn!(frame = frame.handle.id(), error = %err, "frame callback failed");
            report.errors.push(err);
        }
    }
    report
}

/// Fires every timer whose deadline is at or before `now`, earliest first.
pub(super) fn fire_due_timers(queue: &RefCell<FrameQueue>, now: Duration) -> FrameReport {
    let mut report = FrameReport::default();
    loop {
        let due = queue.borrow_mut().pop_due_timer(now);
        let Some(callback) = due else {
            break;
        };
        report.timers_fired += 1;
        callback();
    }
    report
}
