//! Address range rules.

use std::net::IpAddr;

use ipnet::IpNet;
use serde::Serialize;
use tracing::debug;

use super::{AccessError, Result};

/// A single network prefix an address can fall into.
///
/// Bare addresses are normalized to a full-length prefix (`/32` for IPv4,
/// `/128` for IPv6), so `"203.0.113.5"` and `"203.0.113.5/32"` are the same
/// rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeRule(IpNet);

impl RangeRule {
    /// Parse a rule entry (`"10.0.0.0/8"`, `"10.1.2.3"`, `"2001:db8::/32"`).
    pub fn parse(entry: &str) -> Result<Self> {
        let entry = entry.trim();

        if entry.is_empty() {
            return Err(AccessError::InvalidRule {
                entry: String::new(),
                reason: "empty rule".to_string(),
            });
        }

        if !entry.contains('/')
            && let Ok(ip) = entry.parse::<IpAddr>()
        {
            return Ok(Self(IpNet::from(ip)));
        }

        entry
            .parse::<IpNet>()
            .map(Self)
            .map_err(|e| AccessError::InvalidRule {
                entry: entry.to_string(),
                reason: e.to_string(),
            })
    }

    /// Check if an address lies within this range.
    ///
    /// Addresses never match a prefix of the other family.
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.0.contains(&ip)
    }

    /// The underlying prefix.
    pub fn net(&self) -> IpNet {
        self.0
    }

    /// Prefix length in bits.
    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Whether this rule covers exactly one address.
    pub fn is_single_address(&self) -> bool {
        self.0.prefix_len() == self.0.max_prefix_len()
    }
}

impl From<IpAddr> for RangeRule {
    fn from(ip: IpAddr) -> Self {
        Self(IpNet::from(ip))
    }
}

impl From<IpNet> for RangeRule {
    fn from(net: IpNet) -> Self {
        Self(net)
    }
}

impl std::fmt::Display for RangeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RangeRule {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Which rule list an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleList {
    Allow,
    Deny,
}

impl std::fmt::Display for RuleList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleList::Allow => write!(f, "allow"),
            RuleList::Deny => write!(f, "deny"),
        }
    }
}

/// An entry that was dropped while compiling a rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// List the entry belonged to.
    pub list: RuleList,

    /// Entry text after trimming.
    pub entry: String,

    /// Why it was rejected.
    pub error: AccessError,
}

impl std::fmt::Display for RejectedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} list: {}", self.list, self.error)
    }
}

/// An ordered set of range rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<RangeRule>,
}

impl RuleSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule.
    pub fn add(&mut self, rule: RangeRule) {
        self.rules.push(rule);
    }

    /// Check if an address matches any rule.
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.rules.iter().any(|rule| rule.contains(ip))
    }

    /// Whether at least one rule was compiled.
    pub fn is_configured(&self) -> bool {
        !self.rules.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Rules in insertion order.
    pub fn rules(&self) -> &[RangeRule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RangeRule> {
        self.rules.iter()
    }
}

impl FromIterator<RangeRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = RangeRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Compile textual entries into a rule set.
///
/// Blank entries are skipped. Entries that fail to parse are left out of the
/// set and returned alongside it.
pub fn compile_rules<I>(list: RuleList, entries: I) -> (RuleSet, Vec<RejectedEntry>)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut rules = RuleSet::new();
    let mut rejected = Vec::new();

    for entry in entries {
        let entry = entry.as_ref().trim();
        if entry.is_empty() {
            continue;
        }

        match RangeRule::parse(entry) {
            Ok(rule) => rules.add(rule),
            Err(error) => {
                debug!(list = %list, entry, error = %error, "Ignoring unparsable access rule");
                rejected.push(RejectedEntry {
                    list,
                    entry: entry.to_string(),
                    error,
                });
            }
        }
    }

    (rules, rejected)
}
