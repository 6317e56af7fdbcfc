// Copyright (c) 2025 - Cowboy AI, Inc.
//! Infrastructure Domain Models
//!
//! Value objects with validation invariants shared by the resource graph,
//! the security allow-graph and the service definitions.
//!
//! # Value Objects with Invariants
//!
//! - [`Hostname`] - RFC 1123 hostnames for endpoints and service discovery
//! - [`Cidr`] - IPv4/IPv6 blocks with containment and subnet carving
//! - [`PortRange`] - inclusive port ranges
//! - [`Protocol`] - transport protocol
//! - [`ResourceKind`] - taxonomy of declarative resource nodes

pub mod hostname;
pub mod invariants;
pub mod network;
pub mod resource_kind;

pub use hostname::{Hostname, HostnameError};
pub use invariants::{ValidationError, ValidationResult};
pub use network::{Cidr, NetworkError, PortRange, Protocol};
pub use resource_kind::{ResourceCategory, ResourceKind};
