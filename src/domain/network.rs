// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants
//!
//! CIDR blocks (with containment and subnet carving), port ranges and
//! transport protocols used by the network definition and the security
//! allow-graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4, 0-128 for IPv6)")]
    InvalidPrefixLength(u8),

    #[error("Cannot carve /{requested} subnets out of {block}")]
    InvalidSubnetMask { block: String, requested: u8 },

    #[error("Subnet index {index} exceeds the {available} /{mask} subnets of {block}")]
    SubnetExhausted {
        block: String,
        mask: u8,
        index: u32,
        available: u64,
    },

    #[error("Invalid port range: {from}-{to}")]
    InvalidPortRange { from: u16, to: u16 },

    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),
}

/// CIDR block value object
///
/// Invariants:
/// - Valid IP address
/// - Prefix length 0-32 for IPv4, 0-128 for IPv6
///
/// # Examples
///
/// ```rust
/// use genai_infra::domain::Cidr;
///
/// let vpc = Cidr::new("10.0.0.0/16").unwrap();
/// let subnet = vpc.subnet(24, 3).unwrap();
/// assert_eq!(subnet.to_string(), "10.0.3.0/24");
/// assert!(vpc.contains(&subnet));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cidr {
    address: IpAddr,
    prefix_length: u8,
}

impl Cidr {
    /// Parse `address/prefix` notation
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();
        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = IpAddr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        Self::from_parts(address, prefix_length)
    }

    /// Create from separate address and prefix
    pub fn from_parts(address: IpAddr, prefix_length: u8) -> Result<Self, NetworkError> {
        if prefix_length > max_prefix(&address) {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        Ok(Self {
            address,
            prefix_length,
        })
    }

    /// IPv4 block from an address; prefixes beyond 32 are clamped
    pub fn ipv4(address: Ipv4Addr, prefix_length: u8) -> Self {
        Self {
            address: IpAddr::V4(address),
            prefix_length: prefix_length.min(32),
        }
    }

    /// The whole IPv4 space (`0.0.0.0/0`)
    pub fn any_ipv4() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            prefix_length: 0,
        }
    }

    /// The whole IPv6 space (`::/0`)
    pub fn any_ipv6() -> Self {
        Self {
            address: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            prefix_length: 0,
        }
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    pub fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    pub fn is_ipv6(&self) -> bool {
        self.address.is_ipv6()
    }

    /// Network address (host bits cleared)
    pub fn network(&self) -> IpAddr {
        from_bits(&self.address, self.masked_bits())
    }

    /// Whether `other` lies entirely within this block
    pub fn contains(&self, other: &Cidr) -> bool {
        if self.is_ipv4() != other.is_ipv4() || other.prefix_length < self.prefix_length {
            return false;
        }
        mask(to_bits(&other.address), self.prefix_length, &self.address) == self.masked_bits()
    }

    /// Whether a single address lies within this block
    pub fn contains_addr(&self, addr: IpAddr) -> bool {
        let width = max_prefix(&addr);
        match Self::from_parts(addr, width) {
            Ok(host) => self.contains(&host),
            Err(_) => false,
        }
    }

    /// Number of `/mask` subnets this block can be carved into
    pub fn subnet_count(&self, mask: u8) -> Result<u64, NetworkError> {
        if mask < self.prefix_length || mask > max_prefix(&self.address) {
            return Err(NetworkError::InvalidSubnetMask {
                block: self.to_string(),
                requested: mask,
            });
        }
        let bits = u32::from(mask - self.prefix_length);
        Ok(if bits >= 64 { u64::MAX } else { 1u64 << bits })
    }

    /// The `index`-th `/mask` subnet of this block, in address order
    pub fn subnet(&self, mask: u8, index: u32) -> Result<Cidr, NetworkError> {
        let available = self.subnet_count(mask)?;
        if u64::from(index) >= available {
            return Err(NetworkError::SubnetExhausted {
                block: self.to_string(),
                mask,
                index,
                available,
            });
        }

        let host_bits = u32::from(max_prefix(&self.address) - mask);
        let offset = if host_bits >= 128 {
            0
        } else {
            u128::from(index) << host_bits
        };
        let bits = self.masked_bits() | offset;

        Ok(Self {
            address: from_bits(&self.address, bits),
            prefix_length: mask,
        })
    }

    fn masked_bits(&self) -> u128 {
        mask(to_bits(&self.address), self.prefix_length, &self.address)
    }
}

fn max_prefix(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn to_bits(addr: &IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(u32::from(*v4)),
        IpAddr::V6(v6) => u128::from(*v6),
    }
}

fn from_bits(family: &IpAddr, bits: u128) -> IpAddr {
    match family {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::from(bits as u32)),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

fn mask(bits: u128, prefix_length: u8, family: &IpAddr) -> u128 {
    let width = u32::from(max_prefix(family));
    let host_bits = width - u32::from(prefix_length);
    if host_bits >= 128 {
        return 0;
    }
    let full: u128 = if width == 128 { u128::MAX } else { (1u128 << width) - 1 };
    bits & (full & !((1u128 << host_bits) - 1))
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_length)
    }
}

impl FromStr for Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Cidr {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Cidr> for String {
    fn from(value: Cidr) -> Self {
        value.to_string()
    }
}

/// Transport protocol of a rule or endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    /// Any protocol (only meaningful on rules)
    All,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
            Self::All => "all",
        }
    }

    /// Whether a rule declared with `self` admits traffic using `other`
    pub fn admits(&self, other: Protocol) -> bool {
        *self == Protocol::All || *self == other
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "icmp" => Ok(Self::Icmp),
            "all" | "-1" => Ok(Self::All),
            _ => Err(NetworkError::UnknownProtocol(s.to_string())),
        }
    }
}

/// Inclusive port range
///
/// Invariant: `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPortRange")]
pub struct PortRange {
    from: u16,
    to: u16,
}

#[derive(Deserialize)]
struct RawPortRange {
    from: u16,
    to: u16,
}

impl TryFrom<RawPortRange> for PortRange {
    type Error = NetworkError;

    fn try_from(raw: RawPortRange) -> Result<Self, Self::Error> {
        Self::new(raw.from, raw.to)
    }
}

impl PortRange {
    /// Every port
    pub const ALL: PortRange = PortRange {
        from: 0,
        to: u16::MAX,
    };

    pub fn new(from: u16, to: u16) -> Result<Self, NetworkError> {
        if from > to {
            return Err(NetworkError::InvalidPortRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn single(port: u16) -> Self {
        Self {
            from: port,
            to: port,
        }
    }

    pub fn from(&self) -> u16 {
        self.from
    }

    pub fn to(&self) -> u16 {
        self.to
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.from..=self.to).contains(&port)
    }

    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            f.write_str("all")
        } else if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cidr_parsing() {
        let cidr = Cidr::new("10.0.0.0/16").unwrap();
        assert!(cidr.is_ipv4());
        assert_eq!(cidr.prefix_length(), 16);
        assert_eq!(cidr.to_string(), "10.0.0.0/16");

        let v6 = Cidr::new("2001:db8::/32").unwrap();
        assert!(v6.is_ipv6());
    }

    #[test]
    fn test_invalid_cidr() {
        assert!(matches!(Cidr::new("10.0.0.0"), Err(NetworkError::InvalidCidr(_))));
        assert!(matches!(
            Cidr::new("999.0.0.0/8"),
            Err(NetworkError::InvalidIpAddress(_))
        ));
        assert_eq!(
            Cidr::new("10.0.0.0/33"),
            Err(NetworkError::InvalidPrefixLength(33))
        );
        assert_eq!(
            Cidr::new("2001:db8::/129"),
            Err(NetworkError::InvalidPrefixLength(129))
        );
    }

    #[test]
    fn test_network_address() {
        let cidr = Cidr::new("10.0.7.9/16").unwrap();
        assert_eq!(cidr.network().to_string(), "10.0.0.0");
    }

    #[test]
    fn test_containment() {
        let vpc = Cidr::new("10.0.0.0/16").unwrap();
        assert!(vpc.contains(&Cidr::new("10.0.4.0/24").unwrap()));
        assert!(vpc.contains(&vpc));
        assert!(!vpc.contains(&Cidr::new("10.1.0.0/24").unwrap()));
        assert!(!vpc.contains(&Cidr::new("10.0.0.0/8").unwrap()));
        assert!(!vpc.contains(&Cidr::new("2001:db8::/64").unwrap()));

        assert!(Cidr::any_ipv4().contains(&vpc));
        assert!(Cidr::any_ipv6().contains(&Cidr::new("2001:db8::/64").unwrap()));
        assert!(vpc.contains_addr("10.0.200.1".parse().unwrap()));
        assert!(!vpc.contains_addr("192.168.0.1".parse().unwrap()));
    }

    #[test]
    fn test_subnet_carving() {
        let vpc = Cidr::new("10.0.0.0/16").unwrap();
        assert_eq!(vpc.subnet_count(24).unwrap(), 256);
        assert_eq!(vpc.subnet(24, 0).unwrap().to_string(), "10.0.0.0/24");
        assert_eq!(vpc.subnet(24, 5).unwrap().to_string(), "10.0.5.0/24");
        assert!(matches!(
            vpc.subnet(24, 256),
            Err(NetworkError::SubnetExhausted { .. })
        ));
        assert!(matches!(
            vpc.subnet(8, 0),
            Err(NetworkError::InvalidSubnetMask { .. })
        ));
    }

    #[test]
    fn test_protocol_admits() {
        assert!(Protocol::All.admits(Protocol::Udp));
        assert!(Protocol::Tcp.admits(Protocol::Tcp));
        assert!(!Protocol::Tcp.admits(Protocol::Udp));
        assert_eq!("TCP".parse::<Protocol>().unwrap(), Protocol::Tcp);
        assert!("sctp".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_port_range() {
        let range = PortRange::new(8000, 8100).unwrap();
        assert!(range.contains(8080));
        assert!(!range.contains(443));
        assert_eq!(range.to_string(), "8000-8100");
        assert_eq!(PortRange::single(443).to_string(), "443");
        assert_eq!(PortRange::ALL.to_string(), "all");
        assert!(PortRange::new(10, 1).is_err());
    }

    #[test]
    fn test_port_range_deserialization_keeps_order() {
        let range: PortRange = serde_json::from_str(r#"{"from":8000,"to":8100}"#).unwrap();
        assert_eq!(range, PortRange::new(8000, 8100).unwrap());
        assert_eq!(
            serde_json::to_string(&range).unwrap(),
            r#"{"from":8000,"to":8100}"#
        );

        let err = serde_json::from_str::<PortRange>(r#"{"from":10,"to":1}"#).unwrap_err();
        assert!(err.to_string().contains("10"), "{err}");
    }
}
