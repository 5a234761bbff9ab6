//! Binary entry point for the tether CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use tether::{ConfigError, DemoError, DemoReport, TetherConfig, run_demo};

mod cli;

use cli::{Cli, DemoCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("demo failed: {0}")]
    Demo(#[from] DemoError),
    #[error("failed to write output: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config = TetherConfig::load_without_cli_args()?;
    match cli {
        Cli::Demo(command) => {
            let effective = apply_overrides(config, &command);
            let report = run_demo(&effective, command.targets).await?;
            write_report(io::stdout(), &report)
        }
        Cli::Config => write_config(io::stdout(), &config),
    }
}

fn apply_overrides(config: TetherConfig, command: &DemoCommand) -> TetherConfig {
    TetherConfig {
        duration_ms: command.duration_ms.unwrap_or(config.duration_ms),
        frame_interval_ms: command
            .frame_interval_ms
            .unwrap_or(config.frame_interval_ms),
        stop_on_error: Some(command.stop_on_error || config.stops_on_error()),
    }
}

fn write_report(mut target: impl Write, report: &DemoReport) -> Result<(), CliError> {
    let output_error = |err: io::Error| CliError::Output(err.to_string());
    writeln!(target, "frames: {}", report.frames).map_err(output_error)?;
    writeln!(target, "reads: {}", report.reads).map_err(output_error)?;
    if report.failures > 0 {
        writeln!(target, "failures: {}", report.failures).map_err(output_error)?;
    }
    for (index, value) in report.values.iter().enumerate() {
        let written = match value {
            Some(copied) => writeln!(target, "target {index}: {copied}"),
            None => writeln!(target, "target {index}: unset"),
        };
        written.map_err(output_error)?;
    }
    Ok(())
}

fn write_config(mut target: impl Write, config: &TetherConfig) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(&config.resolved())
        .map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target, "{rendered}").map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn demo_command() -> DemoCommand {
        DemoCommand {
            targets: 2,
            duration_ms: None,
            frame_interval_ms: None,
            stop_on_error: false,
        }
    }

    #[rstest]
    fn overrides_replace_only_the_flags_given() {
        let command = DemoCommand {
            duration_ms: Some(250),
            ..demo_command()
        };

        let effective = apply_overrides(TetherConfig::defaults(), &command);

        assert_eq!(effective.duration_ms, 250);
        assert_eq!(
            effective.frame_interval_ms,
            TetherConfig::defaults().frame_interval_ms
        );
        assert_eq!(effective.stop_on_error, Some(false));
    }

    #[rstest]
    fn stop_on_error_flag_wins_over_config() {
        let command = DemoCommand {
            stop_on_error: true,
            ..demo_command()
        };

        assert!(apply_overrides(TetherConfig::defaults(), &command).stops_on_error());
    }

    #[rstest]
    fn stop_on_error_from_config_survives_without_flag() {
        let config = TetherConfig {
            stop_on_error: Some(true),
            ..TetherConfig::defaults()
        };

        assert!(apply_overrides(config, &demo_command()).stops_on_error());
    }

    #[rstest]
    fn write_report_lists_every_target() {
        let report = DemoReport {
            frames: 4,
            reads: 4,
            values: vec![Some(4), None],
            failures: 0,
        };
        let mut buf = Vec::new();

        write_report(&mut buf, &report).expect("write should succeed");

        let rendered = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            rendered,
            "frames: 4\nreads: 4\ntarget 0: 4\ntarget 1: unset\n"
        );
    }

    #[rstest]
    fn write_config_renders_json() {
        let mut buf = Vec::new();

        write_config(&mut buf, &TetherConfig::defaults()).expect("write should succeed");

        let rendered = String::from_utf8(buf).expect("utf8");
        assert!(rendered.contains("\"duration_ms\": 3000"), "rendered: {rendered}");
        assert!(rendered.contains("\"stop_on_error\": false"), "rendered: {rendered}");
    }

    #[rstest]
    fn write_error_writes_cli_error() {
        let mut buf = Vec::new();
        let err = CliError::Output(String::from("broken pipe"));
        write_error(&mut buf, &err);
        let rendered = String::from_utf8(buf).expect("utf8");
        assert!(
            rendered.contains("failed to write output: broken pipe"),
            "rendered: {rendered}"
        );
    }
}
