//! Integration tests for the ipguard-access crate.
//!
//! Covers the decision table end to end:
//! - Fail-open behaviour with no rules
//! - Deny precedence and exhaustive allow lists
//! - Bare address normalization
//! - Peer address extraction feeding the checker
//! - Concurrent readers

use std::sync::Arc;

use ipguard_access::{
    AccessConfig, AccessDecision, AccessPolicy, BlockReason, IpAccessChecker, RangeRule,
    extract_address,
};

const NO_RULES: [&str; 0] = [];

// ============================================================================
// DECISION TABLE
// ============================================================================

mod decisions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_allow_range_with_denied_host() {
        let checker = IpAccessChecker::new(["10.0.0.0/8"], ["10.1.2.3"]);

        assert!(!checker.is_allowed("10.1.2.3"));
        assert!(checker.is_allowed("10.5.5.5"));
        assert!(!checker.is_allowed("8.8.8.8"));
        assert!(!checker.is_allowed("garbage"));
    }

    #[test]
    fn test_deny_range_without_allow_list() {
        let checker = IpAccessChecker::new(NO_RULES, ["192.168.0.0/16"]);

        assert!(!checker.is_allowed("192.168.1.1"));
        assert!(checker.is_allowed("1.1.1.1"));
    }

    #[test]
    fn test_no_rules_allows_malformed_input() {
        let checker = IpAccessChecker::new(["", "   "], Vec::<String>::new());

        for input in ["", "garbage", "10.0.0.1:80", "999.1.1.1", "::1", "1.2.3.4"] {
            assert!(checker.is_allowed(input), "{input:?} should be allowed");
        }
    }

    #[test]
    fn test_deny_dominates_every_overlapping_allow() {
        let checker = IpAccessChecker::new(
            ["0.0.0.0/0", "10.0.0.0/8", "10.1.2.3"],
            ["10.1.0.0/16"],
        );

        for addr in ["10.1.0.0", "10.1.2.3", "10.1.255.255"] {
            assert_eq!(
                checker.decide(addr),
                AccessDecision::Blocked(BlockReason::Denied),
                "{addr}"
            );
        }
        assert!(checker.is_allowed("10.2.0.0"));
        assert!(checker.is_allowed("172.16.0.1"));
    }

    #[test]
    fn test_mixed_families() {
        let checker = IpAccessChecker::new(["2001:db8::/32", "192.0.2.0/24"], ["2001:db8:dead::/48"]);

        assert!(checker.is_allowed("2001:db8:1::1"));
        assert!(checker.is_allowed("192.0.2.44"));
        assert!(!checker.is_allowed("2001:db8:dead::1"));
        assert!(!checker.is_allowed("198.51.100.1"));
        assert!(!checker.is_allowed("::ffff:192.0.2.44"));
    }

    #[test]
    fn test_decisions_are_idempotent() {
        let checker = IpAccessChecker::new(["10.0.0.0/8"], ["10.1.2.3"]);

        for addr in ["10.1.2.3", "10.5.5.5", "8.8.8.8", "garbage"] {
            let first = checker.decide(addr);
            for _ in 0..10 {
                assert_eq!(checker.decide(addr), first);
            }
        }
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

mod normalization {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_v4_equals_slash_32() {
        let bare = IpAccessChecker::new(["203.0.113.5"], NO_RULES);
        let cidr = IpAccessChecker::new(["203.0.113.5/32"], NO_RULES);

        for addr in ["203.0.113.5", "203.0.113.4", "203.0.113.6", "garbage"] {
            assert_eq!(bare.decide(addr), cidr.decide(addr), "{addr}");
        }
        assert_eq!(bare.allow_rules(), cidr.allow_rules());
    }

    #[test]
    fn test_bare_v6_equals_slash_128() {
        let bare = IpAccessChecker::new(NO_RULES, ["2001:db8::42"]);
        let cidr = IpAccessChecker::new(NO_RULES, ["2001:db8::42/128"]);

        for addr in ["2001:db8::42", "2001:db8::43", "10.0.0.1"] {
            assert_eq!(bare.decide(addr), cidr.decide(addr), "{addr}");
        }
        assert_eq!(bare.deny_rules(), cidr.deny_rules());
    }

    #[test]
    fn test_padded_entries_are_trimmed() {
        let checker = IpAccessChecker::new(["  10.0.0.0/8  ", "\t::1\n"], NO_RULES);

        assert_eq!(checker.allow_rules().len(), 2);
        assert!(checker.rejected_entries().is_empty());
        assert!(checker.is_allowed("10.3.3.3"));
        assert!(checker.is_allowed("::1"));
    }

    #[test]
    fn test_unparsable_entries_are_dropped_silently() {
        let checker = IpAccessChecker::new(["10.0.0.0/8", "ten.dot.zero", "10.0.0.0/40"], NO_RULES);

        assert_eq!(checker.allow_rules().len(), 1);
        assert!(checker.is_allowed("10.0.0.1"));
        assert!(!checker.is_allowed("11.0.0.1"));

        let dropped: Vec<&str> = checker
            .rejected_entries()
            .iter()
            .map(|r| r.entry.as_str())
            .collect();
        assert_eq!(dropped, vec!["ten.dot.zero", "10.0.0.0/40"]);
    }

    #[test]
    fn test_range_rule_display() {
        let rule: RangeRule = "2001:db8::1".parse().unwrap();
        assert_eq!(rule.to_string(), "2001:db8::1/128");
    }
}

// ============================================================================
// PEER ADDRESSES
// ============================================================================

mod peers {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_address_examples() {
        assert_eq!(extract_address("198.51.100.7:8443"), "198.51.100.7");
        assert_eq!(extract_address("198.51.100.7"), "198.51.100.7");
        assert_eq!(extract_address("not-an-address"), "");
        assert_eq!(extract_address("[::1]:443"), "::1");
    }

    #[test]
    fn test_empty_extraction_is_denied_when_rules_exist() {
        let checker = IpAccessChecker::new(NO_RULES, ["192.0.2.1"]);

        let addr = extract_address("not-an-address");
        assert_eq!(addr, "");
        assert_eq!(
            checker.decide(addr),
            AccessDecision::Blocked(BlockReason::InvalidAddress)
        );
        assert!(!checker.is_peer_allowed("not-an-address"));
        assert!(checker.is_peer_allowed("192.0.2.2:1234"));
    }

    #[test]
    fn test_non_ip_host_is_denied_when_rules_exist() {
        let checker = IpAccessChecker::new(["0.0.0.0/0"], NO_RULES);
        assert!(!checker.is_peer_allowed("localhost:8080"));
    }
}

// ============================================================================
// CONFIG & SHARING
// ============================================================================

mod sharing {
    use super::*;

    #[test]
    fn test_config_round_trip_to_checker() {
        let config: AccessConfig = serde_json::from_str(
            r#"{"allow": ["10.0.0.0/8", " 192.168.1.1 "], "deny": ["10.66.0.0/16", ""]}"#,
        )
        .unwrap();

        let checker = config.build_checker();
        assert!(checker.has_rules());
        assert!(checker.is_allowed("192.168.1.1"));
        assert!(!checker.is_allowed("10.66.1.1"));
    }

    #[test]
    fn test_reconfiguration_builds_new_checker() {
        let first = Arc::new(IpAccessChecker::new(NO_RULES, ["1.2.3.4"]));
        let second = Arc::new(IpAccessChecker::new(NO_RULES, NO_RULES));

        assert!(!first.is_allowed("1.2.3.4"));
        assert!(second.is_allowed("1.2.3.4"));
        // The old instance is untouched by building the new one.
        assert!(!first.is_allowed("1.2.3.4"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers() {
        let checker = Arc::new(IpAccessChecker::new(["10.0.0.0/8"], ["10.1.2.3"]));

        let mut handles = Vec::new();
        for i in 0..32u8 {
            let checker = Arc::clone(&checker);
            handles.push(tokio::spawn(async move {
                let allowed = format!("10.0.{i}.1");
                let outside = format!("172.16.{i}.1");
                (0..200).all(|_| {
                    checker.is_allowed(&allowed)
                        && !checker.is_allowed(&outside)
                        && !checker.is_allowed("10.1.2.3")
                })
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap());
        }
    }
}
