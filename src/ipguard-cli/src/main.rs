//! ipguard CLI - Main entry point.
//!
//! - `check` - evaluate addresses against allow/deny rules
//! - `lint` - report rule entries that would be ignored
//! - `extract` - strip ports from raw peer addresses

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ipguard_cli::cli::{Cli, dispatch_command};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise use the CLI/env log level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.effective_log_level().as_filter_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    dispatch_command(cli)
}
