//! IP allow/deny access control for ipguard.
//!
//! This crate decides whether a connection attempt from a remote address
//! should proceed, given:
//! - An allow set of address ranges (exhaustive when configured)
//! - A deny set of address ranges (always takes precedence)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  raw peer address ("198.51.100.7:8443", "[::1]:443")         │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ extract_address
//! ┌──────────────────────────────▼───────────────────────────────┐
//! │                      IpAccessChecker                         │
//! │  ┌──────────────────────┐      ┌──────────────────────┐      │
//! │  │ deny: RuleSet        │ ───▶ │ allow: RuleSet       │      │
//! │  │ (checked first)      │      │ (exhaustive if set)  │      │
//! │  └──────────────────────┘      └──────────────────────┘      │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                ▼
//!                    AccessDecision (Allowed / Blocked)
//! ```
//!
//! # Example
//!
//! ```rust
//! use ipguard_access::{AccessPolicy, IpAccessChecker, extract_address};
//!
//! let checker = IpAccessChecker::new(["10.0.0.0/8"], ["10.1.2.3"]);
//!
//! let addr = extract_address("10.5.5.5:51234");
//! assert!(checker.is_allowed(&addr));
//! assert!(!checker.is_allowed("10.1.2.3"));
//! assert!(!checker.is_allowed("8.8.8.8"));
//!
//! // An absent checker means no rules are configured.
//! let none: Option<IpAccessChecker> = None;
//! assert!(none.is_allowed("8.8.8.8"));
//! ```

pub mod config;
pub mod peer;
pub mod policy;
pub mod rule;

pub use config::{AccessConfig, AccessConfigBuilder};
pub use peer::{extract_address, split_host_port};
pub use policy::{AccessDecision, AccessPolicy, BlockReason, IpAccessChecker};
pub use rule::{RangeRule, RejectedEntry, RuleList, RuleSet, compile_rules};

use thiserror::Error;

/// Errors for IP access control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// A single rule entry could not be parsed.
    #[error("Invalid rule '{entry}': {reason}")]
    InvalidRule { entry: String, reason: String },

    /// One or more rule entries were rejected while building a strict checker.
    #[error("{} invalid rule(s): {}", .0.len(), format_rejected(.0))]
    InvalidRules(Vec<RejectedEntry>),

    /// A peer address could not be split into host and port.
    #[error("Invalid peer address '{0}': {1}")]
    InvalidPeerAddress(String, &'static str),
}

fn format_rejected(rejected: &[RejectedEntry]) -> String {
    rejected
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, AccessError>;
