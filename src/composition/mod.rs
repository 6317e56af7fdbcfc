// Copyright (c) 2025 - Cowboy AI, Inc.
//! Composition Root
//!
//! Definitions turn a spec into an explicit [`Fragment`] of the deployment:
//! resource nodes, allow rules, release pipelines and endpoints. Nothing is
//! registered through a global scope; each definition returns its fragment
//! plus the handles the next definition needs.
//!
//! ```text
//! NetworkSpec ──▶ NetworkDefinition ──handles──▶ OrchestrationDefinition
//!                        │                               │
//!                        └──────────handles──────────────┴──▶ ServiceDefinition (× services)
//!                                                                    │
//!                        GenAiDemo::synthesize ◀── fragments ────────┘
//!                                │
//!                                ▼
//!                         DeploymentPlan
//! ```

pub mod deployment;
pub mod network;
pub mod orchestration;
pub mod service;

pub use deployment::{DeploymentPlan, GenAiDemo, TAGS_ATTRIBUTE};
pub use network::{GroupHandle, NetworkDefinition, NetworkHandles, NetworkSpec};
pub use orchestration::{ClusterHandles, ClusterSpec, OrchestrationDefinition};
pub use service::{
    IngressSpec, PolicySpec, PublishedPort, ScalingSpec, ScalingTarget, ServiceDefinition,
    ServiceHandles, ServiceSpec, ServiceWiring, SERVICE_CONNECT_LISTENER,
};

use crate::endpoint::ServiceEndpoint;
use crate::graph::NodeSpec;
use crate::pipeline::Pipeline;
use crate::security::SecurityRuleSet;

/// Part of a deployment produced by one definition
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub nodes: Vec<NodeSpec>,
    pub rules: SecurityRuleSet,
    pub pipelines: Vec<Pipeline>,
    /// (listener, endpoint) pairs to bind
    pub endpoints: Vec<(String, ServiceEndpoint)>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its name for later references
    pub fn push(&mut self, node: NodeSpec) -> String {
        let name = node.name().to_string();
        self.nodes.push(node);
        name
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(NodeSpec::name)
    }
}

/// `Scope/Resource` node name
pub(crate) fn node_name(scope: &str, resource: &str) -> String {
    format!("{scope}/{resource}")
}
