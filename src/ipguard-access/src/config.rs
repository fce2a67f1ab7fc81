//! Access control configuration.

use serde::{Deserialize, Serialize};

use super::{IpAccessChecker, Result};

/// Allow and deny rule lists as they appear in configuration.
///
/// Entries are kept as raw text; they are only interpreted when a checker is
/// built from the config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Allowed addresses and ranges.
    #[serde(default, alias = "whitelist", alias = "allowed_ips")]
    pub allow: Vec<String>,

    /// Denied addresses and ranges.
    #[serde(default, alias = "blacklist", alias = "denied_ips")]
    pub deny: Vec<String>,
}

impl AccessConfig {
    /// Create an empty config (no restrictions).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for configuration.
    pub fn builder() -> AccessConfigBuilder {
        AccessConfigBuilder::new()
    }

    /// Whether either list has any entries at all.
    ///
    /// Entries may still be rejected at build time, so a non-empty config
    /// can produce a checker without rules.
    pub fn is_empty(&self) -> bool {
        self.allow.iter().all(|e| e.trim().is_empty())
            && self.deny.iter().all(|e| e.trim().is_empty())
    }

    /// Append the entries of another config.
    pub fn merge(&mut self, other: AccessConfig) {
        self.allow.extend(other.allow);
        self.deny.extend(other.deny);
    }

    /// Build a lenient checker; unparsable entries are dropped.
    pub fn build_checker(&self) -> IpAccessChecker {
        IpAccessChecker::from_config(self)
    }

    /// Build a checker, failing if any entry is unparsable.
    pub fn build_strict_checker(&self) -> Result<IpAccessChecker> {
        IpAccessChecker::strict(&self.allow, &self.deny)
    }
}

/// Builder for AccessConfig.
#[derive(Debug, Default)]
pub struct AccessConfigBuilder {
    config: AccessConfig,
}

impl AccessConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: AccessConfig::new(),
        }
    }

    /// Add an allowed address or range.
    pub fn allow(mut self, entry: impl Into<String>) -> Self {
        self.config.allow.push(entry.into());
        self
    }

    /// Add multiple allowed addresses or ranges.
    pub fn allow_all(mut self, entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.allow.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Add a denied address or range.
    pub fn deny(mut self, entry: impl Into<String>) -> Self {
        self.config.deny.push(entry.into());
        self
    }

    /// Add multiple denied addresses or ranges.
    pub fn deny_all(mut self, entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.deny.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Build the config.
    pub fn build(self) -> AccessConfig {
        self.config
    }
}
