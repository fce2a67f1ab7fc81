//! Rule loading from command-line flags and TOML config files.
//!
//! A config file may carry the lists at the top level or under an
//! `[access]` table:
//!
//! ```toml
//! [access]
//! allow = ["10.0.0.0/8", "2001:db8::/32"]
//! deny = ["10.1.2.3"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use ipguard_access::{AccessConfig, IpAccessChecker};
use serde::Deserialize;
use tracing::{debug, warn};

/// Where to read allow/deny rules from.
#[derive(Debug, Clone, Default, Args)]
pub struct RuleSourceArgs {
    /// TOML file with `allow` / `deny` arrays.
    #[arg(long = "config", short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Allowed address or range. Can be specified multiple times.
    #[arg(long = "allow", short = 'a', value_name = "RULE", action = clap::ArgAction::Append)]
    pub allow: Vec<String>,

    /// Denied address or range. Can be specified multiple times.
    #[arg(long = "deny", short = 'd', value_name = "RULE", action = clap::ArgAction::Append)]
    pub deny: Vec<String>,
}

impl RuleSourceArgs {
    /// Collect rules from the config file (if any) followed by flag rules.
    pub fn load(&self) -> Result<AccessConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => AccessConfig::new(),
        };

        config.merge(
            AccessConfig::builder()
                .allow_all(self.allow.iter().cloned())
                .deny_all(self.deny.iter().cloned())
                .build(),
        );

        Ok(config)
    }

    /// Load rules and build a checker.
    ///
    /// Lenient mode logs rejected entries and carries on without them;
    /// strict mode turns them into an error.
    pub fn build_checker(&self, strict: bool) -> Result<IpAccessChecker> {
        let config = self.load()?;

        if strict {
            return config
                .build_strict_checker()
                .context("Refusing to continue with invalid rules");
        }

        let checker = config.build_checker();
        for rejected in checker.rejected_entries() {
            warn!(list = %rejected.list, entry = %rejected.entry, "Ignoring invalid rule");
        }
        Ok(checker)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    access: Option<AccessConfig>,

    #[serde(flatten)]
    root: AccessConfig,
}

/// Parse access rules from TOML text.
pub fn parse_config(text: &str) -> Result<AccessConfig> {
    let file: ConfigFile = toml::from_str(text).context("Invalid access config")?;

    let mut config = file.root;
    if let Some(access) = file.access {
        config.merge(access);
    }
    Ok(config)
}

/// Read and parse a TOML config file.
pub fn load_config_file(path: &Path) -> Result<AccessConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&text).with_context(|| format!("In {}", path.display()))?;
    debug!(
        path = %path.display(),
        allow = config.allow.len(),
        deny = config.deny.len(),
        "Loaded access config"
    );
    Ok(config)
}
