//! ludev — log kernel device events (uevents) as they arrive.
//!
//! # Usage
//!
//! ```text
//! ludev [--log-format text|json] [--log-filter <directive>]
//! ```
//!
//! Runs in the foreground until a fatal error, then exits non-zero so a
//! process supervisor can restart it.

use anyhow::{Context, Result};
use clap::Parser;

use ludev_daemon::{start_blocking, DaemonConfig, LogFormat};

#[derive(Parser, Debug)]
#[command(
    name = "ludev",
    version,
    about = "Listen for kernel device events and log them",
    long_about = None,
)]
struct Cli {
    /// Log line format written to stderr: text or json.
    #[arg(long, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Log filter directive (tracing EnvFilter syntax). Overrides RUST_LOG.
    #[arg(long, env = "LUDEV_LOG")]
    log_filter: Option<String>,
}

impl From<Cli> for DaemonConfig {
    fn from(cli: Cli) -> Self {
        DaemonConfig {
            log_format: cli.log_format,
            log_filter: cli.log_filter,
        }
    }
}

fn main() -> Result<()> {
    let config = DaemonConfig::from(Cli::parse());
    start_blocking(&config).context("ludev exited with error")
}
