//! `ipguard lint` - report rule entries that would be ignored.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use ipguard_access::{AccessConfig, IpAccessChecker, RuleList};
use serde::Serialize;

use crate::rules_source::RuleSourceArgs;

/// Lint CLI command.
#[derive(Debug, Parser)]
#[command(about = "Report rule entries that would be ignored")]
pub struct LintCli {
    #[command(flatten)]
    pub rules: RuleSourceArgs,

    /// Print the report as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub allow_rules: usize,
    pub deny_rules: usize,
    pub rejected: Vec<RejectedRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRule {
    pub list: RuleList,
    pub entry: String,
    pub reason: String,
}

impl LintReport {
    /// Build a report for a config.
    pub fn from_config(config: &AccessConfig) -> Self {
        Self::from_checker(&config.build_checker())
    }

    pub fn from_checker(checker: &IpAccessChecker) -> Self {
        Self {
            allow_rules: checker.allow_rules().len(),
            deny_rules: checker.deny_rules().len(),
            rejected: checker
                .rejected_entries()
                .iter()
                .map(|r| RejectedRule {
                    list: r.list,
                    entry: r.entry.clone(),
                    reason: r.error.to_string(),
                })
                .collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl std::fmt::Display for LintReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} allow rule(s), {} deny rule(s)",
            self.allow_rules, self.deny_rules
        )?;
        for rule in &self.rejected {
            writeln!(f, "  ignored {} entry '{}': {}", rule.list, rule.entry, rule.reason)?;
        }
        if self.allow_rules == 0 && self.deny_rules == 0 {
            writeln!(f, "  no effective rules: every address will be allowed")?;
        }
        Ok(())
    }
}

impl LintCli {
    /// Run the lint command.
    pub fn run(self) -> Result<ExitCode> {
        let config = self.rules.load()?;
        let report = LintReport::from_config(&config);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{report}");
        }

        if report.is_clean() {
            Ok(ExitCode::SUCCESS)
        } else {
            Ok(ExitCode::FAILURE)
        }
    }
}
