// src/cli.rs

//! CLI argument parsing using `clap` (derive feature).

use clap::{Parser, ValueEnum};

/// Command-line arguments for `buildline`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildline",
    version,
    about = "Incremental asset build orchestrator: clean, transform and watch per asset class.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the manifest (TOML).
    ///
    /// Default: `Buildline.toml` in the current working directory. A missing
    /// manifest falls back to the default project layout.
    #[arg(long, value_name = "PATH", default_value = "Buildline.toml")]
    pub config: String,

    /// Full build plus release header stamping on every script artifact.
    #[arg(long, conflicts_with = "watch")]
    pub release: bool,

    /// Stay alive after the initial build and re-run the affected class
    /// subtree when a watched source changes.
    #[arg(long)]
    pub watch: bool,

    /// Delete the build and dist directories, then exit.
    #[arg(long, conflicts_with_all = ["watch", "release"])]
    pub clean: bool,

    /// Print the composed stage plan without executing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDLINE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
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

impl From<LogLevel> for tracing::Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
