//! Access checker and decision logic.

use std::net::IpAddr;
use std::sync::Arc;

use tracing::debug;

use super::{
    AccessError, Result,
    config::AccessConfig,
    peer::extract_address,
    rule::{RejectedEntry, RuleList, RuleSet, compile_rules},
};

/// Decision for a single address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Address may connect.
    Allowed,

    /// Address is rejected.
    Blocked(BlockReason),
}

impl AccessDecision {
    /// Check if the decision allows access.
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    /// Check if the decision blocks access.
    pub fn is_blocked(&self) -> bool {
        matches!(self, AccessDecision::Blocked(_))
    }

    /// The block reason, if blocked.
    pub fn reason(&self) -> Option<BlockReason> {
        match self {
            AccessDecision::Allowed => None,
            AccessDecision::Blocked(reason) => Some(*reason),
        }
    }
}

/// Reason for blocking an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Address matched the deny list.
    Denied,

    /// Allow list is configured and the address is not in it.
    NotAllowed,

    /// Address could not be parsed while rules are configured.
    InvalidAddress,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::Denied => write!(f, "explicitly denied"),
            BlockReason::NotAllowed => write!(f, "not in allowlist"),
            BlockReason::InvalidAddress => write!(f, "invalid address"),
        }
    }
}

/// Read-only access decisions.
///
/// Implemented for [`IpAccessChecker`] and for the usual ways of holding one
/// (`&T`, `Arc<T>`, `Box<T>`, `Option<T>`). A `None` checker has no rules and
/// allows everything.
pub trait AccessPolicy {
    /// Decide on a bare address.
    fn decide(&self, address: &str) -> AccessDecision;

    /// Whether any allow or deny rule is configured.
    fn has_rules(&self) -> bool;

    /// Check if a bare address is allowed.
    fn is_allowed(&self, address: &str) -> bool {
        self.decide(address).is_allowed()
    }

    /// Check if a raw peer address (`host:port`) is allowed.
    fn is_peer_allowed(&self, peer: &str) -> bool {
        self.is_allowed(extract_address(peer))
    }
}

/// IP access checker built from allow and deny rule lists.
///
/// Immutable after construction; share it behind an `Arc` and call it from
/// any number of threads. Reconfiguration means building a new checker.
#[derive(Debug, Clone, Default)]
pub struct IpAccessChecker {
    /// Allowed ranges. Exhaustive when configured.
    allow: RuleSet,

    /// Denied ranges. Always checked first.
    deny: RuleSet,

    /// Entries dropped during construction.
    rejected: Vec<RejectedEntry>,
}

impl IpAccessChecker {
    /// Build a checker from allow and deny entries.
    ///
    /// Entries are trimmed, blank entries skipped, and bare addresses
    /// widened to single-address ranges. Unparsable entries are dropped and
    /// reported through [`rejected_entries`](Self::rejected_entries).
    pub fn new<A, D>(allow: A, deny: D) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let (allow, mut rejected) = compile_rules(RuleList::Allow, allow);
        let (deny, rejected_deny) = compile_rules(RuleList::Deny, deny);
        rejected.extend(rejected_deny);

        debug!(
            allow_rules = allow.len(),
            deny_rules = deny.len(),
            rejected = rejected.len(),
            "Built IP access checker"
        );

        Self {
            allow,
            deny,
            rejected,
        }
    }

    /// Build a checker, failing if any entry is unparsable.
    pub fn strict<A, D>(allow: A, deny: D) -> Result<Self>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let checker = Self::new(allow, deny);
        if checker.rejected.is_empty() {
            Ok(checker)
        } else {
            Err(AccessError::InvalidRules(checker.rejected))
        }
    }

    /// Build a lenient checker from config.
    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(&config.allow, &config.deny)
    }

    /// Checker with no rules (allows everything).
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Allowed ranges.
    pub fn allow_rules(&self) -> &RuleSet {
        &self.allow
    }

    /// Denied ranges.
    pub fn deny_rules(&self) -> &RuleSet {
        &self.deny
    }

    /// Entries dropped during construction, allow list first.
    pub fn rejected_entries(&self) -> &[RejectedEntry] {
        &self.rejected
    }

    /// Decide on an already parsed address.
    pub fn decide_ip(&self, ip: IpAddr) -> AccessDecision {
        // Order matters: an explicit deny wins over any allow match.
        if self.deny.is_configured() && self.deny.contains(ip) {
            return AccessDecision::Blocked(BlockReason::Denied);
        }

        if self.allow.is_configured() {
            if self.allow.contains(ip) {
                return AccessDecision::Allowed;
            }
            return AccessDecision::Blocked(BlockReason::NotAllowed);
        }

        AccessDecision::Allowed
    }
}

impl AccessPolicy for IpAccessChecker {
    fn decide(&self, address: &str) -> AccessDecision {
        if !self.has_rules() {
            return AccessDecision::Allowed;
        }

        match address.parse::<IpAddr>() {
            Ok(ip) => self.decide_ip(ip),
            Err(_) => AccessDecision::Blocked(BlockReason::InvalidAddress),
        }
    }

    fn has_rules(&self) -> bool {
        self.allow.is_configured() || self.deny.is_configured()
    }
}

impl<P: AccessPolicy + ?Sized> AccessPolicy for &P {
    fn decide(&self, address: &str) -> AccessDecision {
        (**self).decide(address)
    }

    fn has_rules(&self) -> bool {
        (**self).has_rules()
    }
}

impl<P: AccessPolicy + ?Sized> AccessPolicy for Arc<P> {
    fn decide(&self, address: &str) -> AccessDecision {
        (**self).decide(address)
    }

    fn has_rules(&self) -> bool {
        (**self).has_rules()
    }
}

impl<P: AccessPolicy + ?Sized> AccessPolicy for Box<P> {
    fn decide(&self, address: &str) -> AccessDecision {
        (**self).decide(address)
    }

    fn has_rules(&self) -> bool {
        (**self).has_rules()
    }
}

impl<P: AccessPolicy> AccessPolicy for Option<P> {
    fn decide(&self, address: &str) -> AccessDecision {
        match self {
            Some(policy) => policy.decide(address),
            None => AccessDecision::Allowed,
        }
    }

    fn has_rules(&self) -> bool {
        self.as_ref().is_some_and(|policy| policy.has_rules())
    }
}
