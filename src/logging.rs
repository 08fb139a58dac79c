// src/logging.rs

//! Logging bootstrap. The effective level is taken from the `--log-level`
//! flag when given, otherwise from the `BUILDLINE_LOG` environment variable,
//! otherwise `info`.

use std::str::FromStr;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = cli_level
        .map(Level::from)
        .or_else(|| {
            std::env::var("BUILDLINE_LOG")
                .ok()
                .and_then(|s| Level::from_str(s.trim()).ok())
        })
        .unwrap_or(Level::INFO);

    fmt().with_max_level(level).with_target(true).init();
    Ok(())
}
