//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handler::{FailurePolicy, SyncOptions};

/// Default loop lifetime in milliseconds.
pub const DEFAULT_DURATION_MS: u64 = 3000;

/// Default frame period for [`crate::FrameTicker`], roughly 60 frames per
/// second.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Loop settings layered from defaults, `tether.toml`, `TETHER_*`
/// environment variables, and CLI flags, in that order of precedence.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq, Serialize)]
#[ortho_config(
    prefix = "TETHER",
    discovery(
        app_name = "tether",
        env_var = "TETHER_CONFIG_PATH",
        config_file_name = "tether.toml",
        dotfile_name = ".tether.toml",
        project_file_name = "tether.toml"
    )
)]
pub struct TetherConfig {
    /// How long each started loop runs before it is freed.
    #[ortho_config(default = DEFAULT_DURATION_MS)]
    pub duration_ms: u64,
    /// Period between frames when driven by the tokio frame clock.
    #[ortho_config(default = DEFAULT_FRAME_INTERVAL_MS)]
    pub frame_interval_ms: u64,
    /// Free the loop as soon as a getter or setter fails instead of leaving
    /// it marked as running until the duration elapses. Unset means `false`.
    pub stop_on_error: Option<bool>,
}

impl TetherConfig {
    /// Built-in defaults, identical to what the loader yields with no
    /// configuration file, environment, or flags.
    #[must_use]
    pub const fn defaults() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            stop_on_error: None,
        }
    }

    /// Copy with every optional setting replaced by its effective value.
    #[must_use]
    pub const fn resolved(&self) -> Self {
        Self {
            duration_ms: self.duration_ms,
            frame_interval_ms: self.frame_interval_ms,
            stop_on_error: Some(self.stops_on_error()),
        }
    }

    /// Whether failing frames free the loop.
    #[must_use]
    pub const fn stops_on_error(&self) -> bool {
        matches!(self.stop_on_error, Some(true))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("tether")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Rejects settings that would make a loop meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroValue`] naming the first field set to zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_ms == 0 {
            return Err(ConfigError::ZeroValue {
                field: "duration_ms",
                env_var: "TETHER_DURATION_MS",
            });
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::ZeroValue {
                field: "frame_interval_ms",
                env_var: "TETHER_FRAME_INTERVAL_MS",
            });
        }
        Ok(())
    }

    /// Loop lifetime as a [`Duration`].
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Frame period as a [`Duration`].
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Failure policy selected by `stop_on_error`.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        if self.stops_on_error() {
            FailurePolicy::Stop
        } else {
            FailurePolicy::Propagate
        }
    }
}

impl From<&TetherConfig> for SyncOptions {
    fn from(config: &TetherConfig) -> Self {
        Self {
            duration: config.duration(),
            failure_policy: config.failure_policy(),
        }
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// A field that must be positive was set to zero.
    #[error("{field} must be greater than zero: set {env_var} or {field} in tether.toml")]
    ZeroValue {
        /// Name of the offending field.
        field: &'static str,
        /// Environment variable that overrides the field.
        env_var: &'static str,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
