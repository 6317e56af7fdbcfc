// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Security Allow-Graph
//!
//! Verifies default deny, that every declared rule admits its own traffic,
//! and that adding rules never revokes anything.

use genai_infra::domain::{PortRange, Protocol};
use genai_infra::security::{Principal, SecurityRuleSet};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

fn group() -> impl Strategy<Value = Principal> {
    prop::sample::select(vec!["ALB-SG", "Frontend-SG", "Backend-SG", "Db-SG"])
        .prop_map(Principal::group)
}

fn protocol() -> impl Strategy<Value = Protocol> {
    prop_oneof![Just(Protocol::Tcp), Just(Protocol::Udp), Just(Protocol::Icmp)]
}

/// (source, destination, port, protocol)
fn rule() -> impl Strategy<Value = (Principal, Principal, u16, Protocol)> {
    (group(), group(), 1u16..10_000, protocol())
}

fn rule_set(rules: &[(Principal, Principal, u16, Protocol)]) -> SecurityRuleSet {
    let mut set = SecurityRuleSet::new();
    for (source, destination, port, protocol) in rules {
        set.add_rule(source.clone(), destination.clone(), *port, *protocol);
    }
    set
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: an empty rule set denies everything
    #[test]
    fn prop_default_deny((source, destination, port, protocol) in rule()) {
        let set = SecurityRuleSet::new();
        prop_assert!(!set.is_allowed(&source, &destination, port, protocol));
    }

    /// Property: every declared rule admits exactly its own traffic
    #[test]
    fn prop_declared_rules_are_allowed(rules in prop::collection::vec(rule(), 1..16)) {
        let set = rule_set(&rules);
        for (source, destination, port, protocol) in &rules {
            prop_assert!(set.is_allowed(source, destination, *port, *protocol));
        }
    }

    /// Property: a query matching no rule exactly is denied
    ///
    /// Generated rules use single ports and concrete protocols on groups,
    /// so admission is plain membership.
    #[test]
    fn prop_undeclared_traffic_is_denied(
        rules in prop::collection::vec(rule(), 0..16),
        query in rule(),
    ) {
        let set = rule_set(&rules);
        let declared = rules.contains(&query);
        let (source, destination, port, protocol) = query;
        prop_assert_eq!(set.is_allowed(&source, &destination, port, protocol), declared);
    }

    /// Property: edges are directed
    #[test]
    fn prop_rules_are_directed((source, destination, port, protocol) in rule()) {
        prop_assume!(source != destination);
        let mut set = SecurityRuleSet::new();
        set.add_rule(source.clone(), destination.clone(), port, protocol);
        prop_assert!(!set.is_allowed(&destination, &source, port, protocol));
    }

    /// Property: adding rules never revokes an allowed query
    #[test]
    fn prop_adding_rules_is_monotonic(
        first in prop::collection::vec(rule(), 0..8),
        second in prop::collection::vec(rule(), 0..8),
        query in rule(),
    ) {
        let before = rule_set(&first);
        let mut after = before.clone();
        after.extend(rule_set(&second));

        let (source, destination, port, protocol) = query;
        if before.is_allowed(&source, &destination, port, protocol) {
            prop_assert!(after.is_allowed(&source, &destination, port, protocol));
        }
        prop_assert!(after.len() >= before.len());
    }

    /// Property: re-declaring a rule leaves the set unchanged
    #[test]
    fn prop_duplicate_rules_collapse(rules in prop::collection::vec(rule(), 0..16)) {
        let once = rule_set(&rules);
        let mut twice = once.clone();
        twice.extend(rule_set(&rules));
        prop_assert_eq!(once, twice);
    }

    /// Property: all-outbound admits any port and protocol to any IPv4 block
    #[test]
    fn prop_all_outbound_covers_ipv4(
        source in group(),
        octets in any::<[u8; 4]>(),
        prefix in 0u8..=32,
        port in any::<u16>(),
        protocol in protocol(),
    ) {
        let mut set = SecurityRuleSet::new();
        set.allow_all_outbound(source.clone());

        let block = genai_infra::domain::Cidr::ipv4(octets.into(), prefix);
        prop_assert!(set.is_allowed(&source, &Principal::Cidr(block), port, protocol));
        prop_assert!(!set.is_allowed(&Principal::Cidr(block), &source, port, protocol));
    }
}

#[test]
fn test_port_range_rule_bounds() {
    let mut set = SecurityRuleSet::new();
    set.add_rule_range(
        Principal::group("ALB-SG"),
        Principal::group("Frontend-SG"),
        PortRange::new(8500, 8510).unwrap(),
        Protocol::Tcp,
    );

    let alb = Principal::group("ALB-SG");
    let frontend = Principal::group("Frontend-SG");
    assert!(set.is_allowed(&alb, &frontend, 8500, Protocol::Tcp));
    assert!(set.is_allowed(&alb, &frontend, 8510, Protocol::Tcp));
    assert!(!set.is_allowed(&alb, &frontend, 8511, Protocol::Tcp));
    assert!(!set.is_allowed(&alb, &frontend, 8505, Protocol::Udp));
}
