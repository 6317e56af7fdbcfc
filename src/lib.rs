//! Declarative infrastructure topology for the GenAI demo
//!
//! The demo's cloud topology expressed as plain values: a resource
//! dependency graph, a security allow-graph, ordered release pipelines and
//! an endpoint registry, composed into a single [`DeploymentPlan`].
//! With the `server` feature the crate also carries the backend's
//! prompt/health HTTP API and the prompt client.

#[cfg(feature = "server")]
pub mod api;
pub mod composition;
pub mod config;
pub mod domain;
pub mod endpoint;
pub mod errors;
pub mod graph;
pub mod pipeline;
pub mod security;
pub mod state_machine;

// Re-export commonly used types
pub use composition::{DeploymentPlan, GenAiDemo};
pub use config::{ClientConfig, DeploymentConfig, InferenceConfig, ServerConfig};
pub use endpoint::{EndpointRegistry, ServiceEndpoint};
pub use errors::{InfrastructureError, InfrastructureResult};
pub use graph::{GraphError, NodeSpec, ResourceGraph, ResourceNode};
pub use pipeline::{define_pipeline, Action, ActionKind, Pipeline, PipelineError, Stage};
pub use security::{Principal, SecurityRule, SecurityRuleSet};
