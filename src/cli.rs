// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

use crate::types::{Invocation, Mode, parse_duration};

/// Command-line arguments for `cmdrelay`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdrelay",
    version,
    about = "Run a command locally or through a configured translation (e.g. kubectl exec).",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Cmdrelay.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDRELAY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// What to capture from the command.
    #[arg(long, value_enum, default_value_t = OutputMode::Run)]
    pub mode: OutputMode,

    /// Kill the command after this long (e.g. "500ms", "5s", "2m").
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Also write the command's stdout to this file.
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Don't log the command's output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the translated command line without running it.
    #[arg(long)]
    pub dry_run: bool,

    /// The command to run, followed by its arguments.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Output capture mode as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Run and wait; print nothing.
    Run,
    /// Print stdout.
    Output,
    /// Print stdout and stderr combined.
    Combined,
}

impl CliArgs {
    /// Map the flags onto exactly one executor operation.
    ///
    /// `--output-file` implies stdout capture, so it can't be combined with
    /// `--mode combined`. Timeouts are only available for the run and
    /// output-file operations.
    pub fn invocation(&self) -> Result<Invocation> {
        let Some((command, args)) = self.command.split_first() else {
            bail!("no command given");
        };

        let mode = match (&self.output_file, self.timeout, self.mode) {
            (Some(_), _, OutputMode::Combined) => {
                bail!("--output-file captures stdout only and can't be used with --mode combined")
            }
            (Some(path), Some(timeout), _) => Mode::OutputFileTimeout {
                timeout,
                path: path.clone(),
            },
            (Some(path), None, _) => Mode::OutputFile(path.clone()),
            (None, Some(timeout), OutputMode::Run) => Mode::Timeout(timeout),
            (None, Some(_), mode) => {
                bail!(
                    "--timeout is not supported with --mode {mode:?}; \
                     use --output-file or --mode run"
                )
            }
            (None, None, OutputMode::Run) => Mode::Run,
            (None, None, OutputMode::Output) => Mode::Output,
            (None, None, OutputMode::Combined) => Mode::CombinedOutput,
        };

        Ok(Invocation {
            suppress: self.quiet,
            command: command.clone(),
            args: args.to_vec(),
            mode,
        })
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
