//! Frame-paced value synchronisation.
//!
//! The crate copies a value read from one source into any number of targets,
//! once per frame, for a bounded duration. Frames and timers come from an
//! injected clock: [`ManualScheduler`] for deterministic stepping in tests
//! and [`FrameTicker`] for a fixed-rate clock on tokio.

pub mod config;
pub mod demo;
pub mod handler;
pub mod scheduler;
pub mod test_support;

pub use config::{ConfigError, TetherConfig};
pub use demo::{CountingSource, DemoError, DemoReport, run_demo};
pub use handler::{
    CallbackError, DEFAULT_DURATION, FailurePolicy, HandlerConfig, SyncError, SyncHandler,
    SyncOptions, Trigger,
};
pub use scheduler::{
    FrameCallback, FrameHandle, FrameReport, FrameScheduler, FrameTicker, ManualScheduler, Timer,
    TimerCallback, TimerHandle,
};
