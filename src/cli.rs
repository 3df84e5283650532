// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for the `showrunner` demo driver.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "showrunner",
    version,
    about = "Run a scheduling scenario against the priority task queue.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the scenario file (TOML).
    ///
    /// Default: `Showrunner.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Showrunner.toml")]
    pub config: String,

    /// Exit once the queue is idle and the script has played out.
    #[arg(long)]
    pub once: bool,

    /// Stop after this many driver ticks, regardless of remaining work.
    #[arg(long, value_name = "N")]
    pub ticks: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHOWRUNNER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the scenario, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
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
