//! ipguard CLI library module.
//!
//! - `cli/` - Argument parsing and command dispatch
//! - `rules_source` - Loading allow/deny rules from flags and TOML files
//! - Command modules - Individual CLI commands (`*_cmd.rs`)

pub mod check_cmd;
pub mod cli;
pub mod extract_cmd;
pub mod lint_cmd;
pub mod rules_source;
