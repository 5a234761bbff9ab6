//! Self-contained run of a sync handler on the tokio frame clock.
//!
//! Backs the `tether demo` subcommand: a counting source is copied into a
//! set of cells until the configured duration elapses.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, TetherConfig};
use crate::handler::{HandlerConfig, SyncHandler, SyncOptions};
use crate::scheduler::FrameTicker;

/// Source whose value is the number of times it has been read.
#[derive(Debug, Default)]
pub struct CountingSource {
    reads: Cell<u64>,
}

impl CountingSource {
    /// Increments the read counter and returns the new count.
    #[must_use]
    pub fn read(&self) -> u64 {
        let next = self.reads.get().saturating_add(1);
        self.reads.set(next);
        next
    }

    /// Number of reads so far.
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.reads.get()
    }
}

/// Target cell written by the demo handler.
pub type DemoTarget = Rc<Cell<Option<u64>>>;

/// Outcome of a demo run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DemoReport {
    /// Frames the ticker ran.
    pub frames: usize,
    /// Times the getter read the source.
    pub reads: u64,
    /// Final value held by each target, in registration order.
    pub values: Vec<Option<u64>>,
    /// Frames that returned an error.
    pub failures: usize,
}

/// Errors raised by [`run_demo`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DemoError {
    /// The supplied configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Copies a [`CountingSource`] into `targets` cells until the loop expires.
///
/// # Errors
///
/// Returns [`DemoError::Config`] when `config` fails validation.
pub async fn run_demo(config: &TetherConfig, targets: usize) -> Result<DemoReport, DemoError> {
    config.validate()?;

    let ticker = FrameTicker::new(config.frame_interval());
    let handler = SyncHandler::new(
        HandlerConfig::new()
            .getter(CountingSource::read)
            .setter(|target: &DemoTarget, value: &u64| target.set(Some(*value)))
            .options(SyncOptions::from(config)),
        ticker.clone(),
    );
    let cells: Vec<DemoTarget> = (0..targets).map(|_| Rc::new(Cell::new(None))).collect();
    for cell in &cells {
        handler.to(Rc::clone(cell));
    }

    let trigger = handler.from(CountingSource::default());
    trigger.invoke();
    let frames = ticker.run_until_idle().await;

    let report = DemoReport {
        frames: frames.frames_run,
        reads: trigger.source().reads(),
        values: cells.iter().map(|cell| cell.get()).collect(),
        failures: frames.errors.len(),
    };
    info!(
        frames = report.frames,
        targets = report.values.len(),
        "demo finished"
    );
    Ok(report)
}
