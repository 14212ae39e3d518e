// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `provrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "provrun",
    version,
    about = "Run a build step and record a provenance attestation for what it produced.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Provrun.toml` in the current directory, if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Working directory for the command (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Echo the command's output while it runs.
    #[arg(short, long)]
    pub verbose: bool,

    /// Where to write the attestation (default: a temp `provenance-*.json`).
    #[arg(short = 'o', long, value_name = "PATH")]
    pub attestation: Option<PathBuf>,

    /// Directory to watch for artifacts. May be repeated; added after any
    /// watchers from the config file.
    #[arg(short, long = "watch", value_name = "DIR")]
    pub watch: Vec<PathBuf>,

    /// Builder identity recorded in the attestation.
    #[arg(long, value_name = "ID")]
    pub builder_id: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROVRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve config and print what would run, without running it.
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

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
