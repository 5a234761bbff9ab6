//! Loop options applied over crate defaults.

use std::time::Duration;

/// Default lifetime of a started loop.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

/// What a handler does with its loop when a getter or setter fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Return the error to the scheduler and leave the loop marked as
    /// running. No further frame is requested, and the duration timer clears
    /// the stale state later.
    #[default]
    Propagate,
    /// Free the loop before returning the error, so the handler goes idle
    /// straight away and can be restarted.
    Stop,
}

/// Options that shape every loop a handler starts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SyncOptions {
    /// Time from `start_loop` until the loop is freed.
    pub duration: Duration,
    /// Reaction to getter and setter failures.
    pub failure_policy: FailurePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            failure_policy: FailurePolicy::Propagate,
        }
    }
}
