//! Command dispatch.

use std::process::ExitCode;

use anyhow::Result;

use super::args::{Cli, Commands};

/// Dispatch a CLI command to its handler.
pub fn dispatch_command(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check(check_cli) => check_cli.run(),
        Commands::Lint(lint_cli) => lint_cli.run(),
        Commands::Extract(extract_cli) => extract_cli.run(),
    }
}
