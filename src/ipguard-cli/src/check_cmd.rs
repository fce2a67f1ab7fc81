//! `ipguard check` - evaluate addresses against allow/deny rules.

use std::io::{self, BufRead};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ipguard_access::{AccessPolicy, extract_address};
use serde::Serialize;
use tracing::info;

use crate::rules_source::RuleSourceArgs;

/// Check CLI command.
#[derive(Debug, Parser)]
#[command(about = "Check whether addresses are allowed by the configured rules")]
pub struct CheckCli {
    #[command(flatten)]
    pub rules: RuleSourceArgs,

    /// Addresses to check. Read from stdin, one per line, when omitted.
    #[arg(value_name = "ADDRESS")]
    pub addresses: Vec<String>,

    /// Treat inputs as raw peer addresses (`host:port`) and strip the port.
    #[arg(long = "peer")]
    pub peer: bool,

    /// Fail if any rule entry is invalid instead of ignoring it.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Print results as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

/// Result for one checked input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Input as given.
    pub input: String,

    /// Address the rules were evaluated against.
    pub address: String,

    pub allowed: bool,

    /// Block reason, when blocked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.allowed { "allow" } else { "deny" };
        write!(f, "{verdict} {}", self.input)?;
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

/// Evaluate each input against a policy.
pub fn evaluate<P, I>(policy: &P, inputs: I, peer: bool) -> Vec<CheckOutcome>
where
    P: AccessPolicy + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    inputs
        .into_iter()
        .map(|input| {
            let input = input.as_ref();
            let address = if peer { extract_address(input) } else { input };
            let decision = policy.decide(address);
            CheckOutcome {
                input: input.to_string(),
                address: address.to_string(),
                allowed: decision.is_allowed(),
                reason: decision.reason().map(|r| r.to_string()),
            }
        })
        .collect()
}

impl CheckCli {
    /// Run the check command.
    pub fn run(self) -> Result<ExitCode> {
        let checker = self.rules.build_checker(self.strict)?;
        if !checker.has_rules() {
            info!("No access rules configured; every address is allowed");
        }

        let addresses = if self.addresses.is_empty() {
            read_stdin_lines()?
        } else {
            self.addresses
        };

        let outcomes = evaluate(&checker, &addresses, self.peer);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        } else {
            for outcome in &outcomes {
                println!("{outcome}");
            }
        }

        if outcomes.iter().all(|o| o.allowed) {
            Ok(ExitCode::SUCCESS)
        } else {
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_stdin_lines() -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read addresses from stdin")?;
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}
