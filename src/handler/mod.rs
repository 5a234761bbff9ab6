//! Frame-paced copying of one source value into many targets.
//!
//! A [`SyncHandler`] collects targets with [`SyncHandler::to`], hands out a
//! [`Trigger`] per source with [`SyncHandler::from`], and when triggered runs
//! a copy loop: on every frame the getter reads the bound source once and the
//! setter writes that value into each target in registration order. A timer
//! armed when the loop starts frees it after the configured duration.
//!
//! All state is single-threaded (`Rc` and `RefCell`). No borrow is held
//! while getters, setters or the scheduler run, so callbacks may call back
//! into the handler.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::scheduler::{FrameHandle, FrameScheduler, Timer, TimerHandle};

mod config;
mod error;
mod options;

pub use config::{Getter, HandlerConfig, Setter};
pub use error::{CallbackError, SyncError};
pub use options::{DEFAULT_DURATION, FailurePolicy, SyncOptions};

/// Copies a value from a bound source into registered targets, one frame at
/// a time, for a bounded duration.
///
/// `S` is the source type, `T` the target type, `V` the copied value and `C`
/// the clock providing frames and timers. Targets are usually cheap shared
/// handles (`Rc<Cell<_>>`, `Rc<RefCell<_>>`) so callers can observe writes.
pub struct SyncHandler<S, T, V, C>
where
    C: FrameScheduler + Timer,
{
    inner: Rc<Inner<S, T, V, C>>,
}

/// Callable returned by [`SyncHandler::from`].
///
/// Each [`Trigger::invoke`] binds its source to the handler and starts the
/// loop unless one is already running.
pub struct Trigger<S, T, V, C>
where
    C: FrameScheduler + Timer,
{
    inner: Rc<Inner<S, T, V, C>>,
    source: Rc<S>,
}

struct Inner<S, T, V, C>
where
    C: FrameScheduler + Timer,
{
    getter: Option<Getter<S, V>>,
    setter: Option<Setter<T, V>>,
    options: SyncOptions,
    clock: C,
    state: RefCell<LoopState<S, T>>,
}

struct LoopState<S, T> {
    items: Rc<Vec<T>>,
    source: Option<Rc<S>>,
    active: Option<FrameHandle>,
    stop_timer: Option<TimerHandle>,
    generation: u64,
}

impl<S, T, V, C> SyncHandler<S, T, V, C>
where
    S: 'static,
    T: Clone + 'static,
    V: 'static,
    C: FrameScheduler + Timer + 'static,
{
    /// Builds an idle handler with no targets and no bound source.
    #[must_use]
    pub fn new(config: HandlerConfig<S, T, V>, clock: C) -> Self {
        let HandlerConfig {
            getter,
            setter,
            options,
        } = config;
        Self {
            inner: Rc::new(Inner {
                getter,
                setter,
                options,
                clock,
                state: RefCell::new(LoopState {
                    items: Rc::new(Vec::new()),
                    source: None,
                    active: None,
                    stop_timer: None,
                    generation: 0,
                }),
            }),
        }
    }

    /// Registers a target. Targets are written in registration order and
    /// duplicates are kept.
    pub fn to(&self, item: T) -> &Self {
        let mut state = self.inner.state.borrow_mut();
        Rc::make_mut(&mut state.items).push(item);
        self
    }

    /// Returns a trigger that binds `source` and starts the loop.
    #[must_use]
    pub fn from(&self, source: S) -> Trigger<S, T, V, C> {
        Trigger {
            inner: Rc::clone(&self.inner),
            source: Rc::new(source),
        }
    }

    /// Starts the copy loop and arms its stop timer. Does nothing while a
    /// loop is already running.
    pub fn start_loop(&self) {
        self.inner.start_loop();
    }

    /// Stops the running loop, if any, cancelling its pending frame and
    /// disarming its stop timer.
    pub fn free_loop(&self) {
        self.inner.free_loop();
    }

    /// Returns `true` while a loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.borrow().active.is_some()
    }

    /// Snapshot of the registered targets in registration order.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        Vec::clone(&self.inner.state.borrow().items)
    }

    /// Number of registered targets.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.inner.state.borrow().items.len()
    }

    /// Currently bound source, if a trigger has run.
    #[must_use]
    pub fn source(&self) -> Option<Rc<S>> {
        self.inner.state.borrow().source.clone()
    }

    /// Options in effect for every loop.
    #[must_use]
    pub fn options(&self) -> SyncOptions {
        self.inner.options
    }
}

impl<S, T, V, C> Trigger<S, T, V, C>
where
    S: 'static,
    T: Clone + 'static,
    V: 'static,
    C: FrameScheduler + Timer + 'static,
{
    /// Binds this trigger's source, replacing any earlier binding, then
    /// starts the loop if it is idle.
    pub fn invoke(&self) {
        self.inner.state.borrow_mut().source = Some(Rc::clone(&self.source));
        self.inner.start_loop();
    }

    /// Source this trigger binds.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, T, V, C> Clone for Trigger<S, T, V, C>
where
    C: FrameScheduler + Timer,
{
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            source: Rc::clone(&self.source),
        }
    }
}

impl<S, T, V, C> Inner<S, T, V, C>
where
    S: 'static,
    T: Clone + 'static,
    V: 'static,
    C: FrameScheduler + Timer + 'static,
{
    fn start_loop(self: &Rc<Self>) {
        let generation = {
            let mut state = self.state.borrow_mut();
            if state.active.is_some() {
                trace!("sync loop already running");
                return;
            }
            state.generation = state.generation.wrapping_add(1);
            state.generation
        };

        let handle = self.schedule_frame(generation);
        self.state.borrow_mut().active = Some(handle);

        let weak = Rc::downgrade(self);
        let timer = self.clock.set_timeout(
            self.options.duration,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.expire(generation);
                }
            }),
        );
        self.state.borrow_mut().stop_timer = Some(timer);
        debug!(generation, duration = ?self.options.duration, "sync loop started");
    }

    fn free_loop(&self) {
        let (active, stop_timer) = {
            let mut state = self.state.borrow_mut();
            (state.active.take(), state.stop_timer.take())
        };
        if let Some(timer) = stop_timer {
            self.clock.clear_timeout(timer);
        }
        if let Some(handle) = active {
            self.clock.cancel_frame(handle);
            debug!(frame = handle.id(), "sync loop stopped");
        }
    }

    /// Stop timer callback. Timers armed for an earlier loop are ignored.
    fn expire(&self, generation: u64) {
        let current = self.state.borrow().generation;
        if current == generation {
            self.free_loop();
        } else {
            trace!(generation, current, "ignoring stop timer from an earlier loop");
        }
    }

    fn schedule_frame(self: &Rc<Self>, generation: u64) -> FrameHandle {
        let weak: Weak<Self> = Rc::downgrade(self);
        self.clock.request_frame(Box::new(move || {
            weak.upgrade()
                .map_or(Ok(()), |inner| inner.run_frame(generation))
        }))
    }

    fn run_frame(self: &Rc<Self>, generation: u64) -> Result<(), SyncError> {
        if let Err(err) = self.copy_value() {
            if self.options.failure_policy == FailurePolicy::Stop {
                self.free_loop();
            }
            return Err(err);
        }
        self.reschedule(generation);
        Ok(())
    }

    /// Requests the next frame unless the loop was freed or replaced while
    /// this frame ran.
    fn reschedule(self: &Rc<Self>, generation: u64) {
        let still_current = {
            let state = self.state.borrow();
            state.active.is_some() && state.generation == generation
        };
        if !still_current {
            return;
        }
        let handle = self.schedule_frame(generation);
        self.state.borrow_mut().active = Some(handle);
    }

    fn copy_value(&self) -> Result<(), SyncError> {
        let (bound, items) = {
            let state = self.state.borrow();
            (state.source.clone(), Rc::clone(&state.items))
        };
        let getter = self.getter.as_ref().ok_or(SyncError::MissingGetter)?;
        let source = bound.ok_or(SyncError::Unbound)?;
        let value = getter(&*source).map_err(|err| SyncError::Getter { source: err })?;
        for (index, item) in items.iter().enumerate() {
            let setter = self.setter.as_ref().ok_or(SyncError::MissingSetter)?;
            setter(item, &value).map_err(|err| SyncError::Setter { index, source: err })?;
        }
        trace!(targets = items.len(), "copied source value");
        Ok(())
    }
}

impl<S, T, V, C> Drop for Inner<S, T, V, C>
where
    C: FrameScheduler + Timer,
{
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let Some(timer) = state.stop_timer.take() {
            self.clock.clear_timeout(timer);
        }
        if let Some(handle) = state.active.take() {
            self.clock.cancel_frame(handle);
        }
    }
}

impl<S, T, V, C> fmt::Debug for SyncHandler<S, T, V, C>
where
    C: FrameScheduler + Timer,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SyncHandler")
            .field("items", &state.items.len())
            .field("bound", &state.source.is_some())
            .field("active", &state.active)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl<S, T, V, C> fmt::Debug for Trigger<S, T, V, C>
where
    S: fmt::Debug,
    C: FrameScheduler + Timer,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
