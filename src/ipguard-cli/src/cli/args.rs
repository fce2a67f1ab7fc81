//! CLI argument structures and parsing.

use clap::{Parser, Subcommand};

use crate::check_cmd::CheckCli;
use crate::extract_cmd::ExtractCli;
use crate::lint_cmd::LintCli;

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// ipguard - IP allow/deny rule evaluation
#[derive(Debug, Parser)]
#[command(name = "ipguard")]
#[command(author, version)]
#[command(about = "Evaluate addresses against IP allow/deny rules", long_about = None)]
pub struct Cli {
    /// Enable verbose output (same as --log-level debug)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Log level for diagnostics written to stderr.
    /// Falls back to IPGUARD_LOG_LEVEL, then "warn".
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Resolve the effective log level from flags and environment.
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            return LogLevel::Debug;
        }
        if let Some(level) = self.log_level {
            return level;
        }
        std::env::var("IPGUARD_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::from_str_loose(&v))
            .unwrap_or_default()
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check whether addresses are allowed by the configured rules
    Check(CheckCli),

    /// Report rule entries that would be ignored
    Lint(LintCli),

    /// Strip the port from raw peer addresses
    Extract(ExtractCli),
}
