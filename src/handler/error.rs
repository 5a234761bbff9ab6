//! Errors raised while copying a value into targets.

use thiserror::Error;

/// Failure type returned by fallible getters and setters.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced from a copy frame.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A frame ran but the handler was built without a getter.
    #[error("no getter configured for the sync handler")]
    MissingGetter,
    /// A target had to be written but the handler was built without a setter.
    #[error("no setter configured for the sync handler")]
    MissingSetter,
    /// A frame ran before any source was bound through a trigger.
    #[error("sync loop ran without a bound source")]
    Unbound,
    /// The getter failed to read the source.
    #[error("getter failed: {source}")]
    Getter {
        /// Error returned by the getter.
        #[source]
        source: CallbackError,
    },
    /// The setter failed to write a target.
    #[error("setter failed for target {index}: {source}")]
    Setter {
        /// Registration index of the target being written.
        index: usize,
        /// Error returned by the setter.
        #[source]
        source: CallbackError,
    },
}
