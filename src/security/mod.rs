// Copyright (c) 2025 - Cowboy AI, Inc.
//! Security Allow-Graph
//!
//! Directed allow edges between principals. Nothing is permitted unless a
//! rule says so, and rules are never removed.
//!
//! # Principals
//!
//! - [`Principal::Group`] - a named security group
//! - [`Principal::AnyIpv4`] / [`Principal::AnyIpv6`] - the whole address family
//! - [`Principal::Cidr`] - a specific block
//!
//! # Matching
//!
//! A rule admits a (source, destination, port, protocol) query when:
//!
//! 1. each rule principal equals the queried one, or covers it by address
//!    (`AnyIpv4` covers every IPv4 block, a block covers its sub-blocks)
//! 2. the port is inside the rule's range
//! 3. the protocols match, or the rule protocol is `All`
//!
//! ```text
//! AnyIpv4 ──443/tcp──▶ GenAIDemo-ALB-SG ──8501/tcp──▶ GenAIDemo-FrontendService-SG
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::domain::{Cidr, PortRange, Protocol};

/// Endpoint of an allow edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Principal {
    Group(String),
    AnyIpv4,
    AnyIpv6,
    Cidr(Cidr),
}

impl Principal {
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }

    /// Address space covered by the principal (groups have none)
    pub fn address_space(&self) -> Option<Cidr> {
        match self {
            Self::Group(_) => None,
            Self::AnyIpv4 => Some(Cidr::any_ipv4()),
            Self::AnyIpv6 => Some(Cidr::any_ipv6()),
            Self::Cidr(cidr) => Some(*cidr),
        }
    }

    /// Whether a rule naming `self` applies to traffic involving `other`
    pub fn covers(&self, other: &Principal) -> bool {
        if self == other {
            return true;
        }
        match (self.address_space(), other.address_space()) {
            (Some(outer), Some(inner)) => outer.contains(&inner),
            _ => false,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(name) => f.write_str(name),
            Self::AnyIpv4 => f.write_str("0.0.0.0/0"),
            Self::AnyIpv6 => f.write_str("::/0"),
            Self::Cidr(cidr) => write!(f, "{cidr}"),
        }
    }
}

impl From<Cidr> for Principal {
    fn from(cidr: Cidr) -> Self {
        Self::Cidr(cidr)
    }
}

/// A directed allow edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityRule {
    pub source: Principal,
    pub destination: Principal,
    pub ports: PortRange,
    pub protocol: Protocol,
}

impl SecurityRule {
    pub fn admits(
        &self,
        source: &Principal,
        destination: &Principal,
        port: u16,
        protocol: Protocol,
    ) -> bool {
        self.source.covers(source)
            && self.destination.covers(destination)
            && self.ports.contains(port)
            && self.protocol.admits(protocol)
    }

    /// Unrestricted traffic (all ports, all protocols)
    pub fn is_unrestricted(&self) -> bool {
        self.ports.is_all() && self.protocol == Protocol::All
    }
}

impl fmt::Display for SecurityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} {}/{}",
            self.source, self.destination, self.ports, self.protocol
        )
    }
}

/// Append-only set of allow edges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityRuleSet {
    rules: Vec<SecurityRule>,
}

impl SecurityRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `source` to reach `destination` on a single port
    pub fn add_rule(
        &mut self,
        source: Principal,
        destination: Principal,
        port: u16,
        protocol: Protocol,
    ) -> &mut Self {
        self.add_rule_range(source, destination, PortRange::single(port), protocol)
    }

    /// Allow `source` to reach `destination` on a port range
    pub fn add_rule_range(
        &mut self,
        source: Principal,
        destination: Principal,
        ports: PortRange,
        protocol: Protocol,
    ) -> &mut Self {
        let rule = SecurityRule {
            source,
            destination,
            ports,
            protocol,
        };
        if self.rules.contains(&rule) {
            debug!(rule = %rule, "Security rule already declared");
        } else {
            debug!(rule = %rule, "Security rule added");
            self.rules.push(rule);
        }
        self
    }

    /// Allow all outbound IPv4 traffic from `principal`
    pub fn allow_all_outbound(&mut self, principal: Principal) -> &mut Self {
        self.add_rule_range(principal, Principal::AnyIpv4, PortRange::ALL, Protocol::All)
    }

    /// Default deny: true iff some declared rule admits the query
    pub fn is_allowed(
        &self,
        source: &Principal,
        destination: &Principal,
        port: u16,
        protocol: Protocol,
    ) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.admits(source, destination, port, protocol))
    }

    /// Rules declared with `principal` as their source
    pub fn rules_from<'a>(
        &'a self,
        principal: &'a Principal,
    ) -> impl Iterator<Item = &'a SecurityRule> + 'a {
        self.rules.iter().filter(move |rule| rule.source == *principal)
    }

    /// Rules declared with `principal` as their destination
    pub fn rules_to<'a>(
        &'a self,
        principal: &'a Principal,
    ) -> impl Iterator<Item = &'a SecurityRule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.destination == *principal)
    }

    /// Append every rule of `other`
    pub fn extend(&mut self, other: SecurityRuleSet) {
        for rule in other.rules {
            self.add_rule_range(rule.source, rule.destination, rule.ports, rule.protocol);
        }
    }

    pub fn rules(&self) -> &[SecurityRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
