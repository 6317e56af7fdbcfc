// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment synthesis
//!
//! [`GenAiDemo::synthesize`] runs every definition, merges their fragments
//! into one resource graph, adds the cross-fragment ordering edges,
//! validates the release pipelines, binds endpoints and resolves the
//! deployment order. Any error aborts the whole synthesis.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    Fragment, NetworkDefinition, OrchestrationDefinition, ServiceDefinition, ServiceWiring,
};
use crate::config::DeploymentConfig;
use crate::endpoint::EndpointRegistry;
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::graph::{NodeId, ResourceGraph, ResourceNode};
use crate::pipeline::Pipeline;
use crate::security::SecurityRuleSet;

/// Immutable result of synthesis, consumed by a deployment executor
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentPlan {
    pub id: Uuid,
    pub project: String,
    pub synthesized_at: DateTime<Utc>,
    /// Tags stamped onto every node as its `tags` attribute
    pub tags: BTreeMap<String, String>,
    /// Nodes in dependency order
    pub nodes: Vec<ResourceNode>,
    /// Groups of nodes that can be deployed concurrently, in order
    pub layers: Vec<Vec<NodeId>>,
    pub security_rules: SecurityRuleSet,
    pub pipelines: Vec<Pipeline>,
    pub endpoints: EndpointRegistry,
}

impl DeploymentPlan {
    pub fn node(&self, name: &str) -> Option<&ResourceNode> {
        self.nodes.iter().find(|node| node.name() == name)
    }

    /// Index of a node in the deployment order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name() == name)
    }

    pub fn pipeline(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|pipeline| pipeline.name() == name)
    }

    pub fn to_json(&self) -> InfrastructureResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Node attribute carrying the deployment tags
pub const TAGS_ATTRIBUTE: &str = "tags";

/// Composition root of the demo deployment
pub struct GenAiDemo;

impl GenAiDemo {
    pub fn synthesize(config: &DeploymentConfig) -> InfrastructureResult<DeploymentPlan> {
        let network = NetworkDefinition::define(&config.network)?;
        let orchestration = OrchestrationDefinition::define(&config.cluster, &network.handles)?;

        let mut services = Vec::with_capacity(config.services.len());
        for spec in &config.services {
            let wiring = ServiceWiring::new(&network.handles, &orchestration.handles, spec)?;
            services.push(ServiceDefinition::define(spec, &wiring)?);
        }

        // (from, to): `from` depends on `to`
        let mut ordering: Vec<(String, String)> = Vec::new();

        // The cluster fragment waits for the whole network
        for node in orchestration.fragment.node_names() {
            for upstream in network.fragment.node_names() {
                ordering.push((node.to_string(), upstream.to_string()));
            }
        }

        for (spec, service) in config.services.iter().zip(&services) {
            for scope in &spec.after {
                let upstream = config
                    .services
                    .iter()
                    .find(|candidate| &candidate.scope == scope)
                    .ok_or_else(|| {
                        InfrastructureError::Configuration(format!(
                            "{} must start after unknown service {scope}",
                            spec.scope
                        ))
                    })?;
                ordering.push((service.handles.service.clone(), upstream.service_node()));
            }
        }

        let fragments = [network.fragment, orchestration.fragment]
            .into_iter()
            .chain(services.into_iter().map(|service| service.fragment));

        let mut specs = Vec::new();
        let mut security_rules = SecurityRuleSet::new();
        let mut pipelines = Vec::new();
        let mut bindings = Vec::new();
        for Fragment {
            nodes,
            rules,
            pipelines: fragment_pipelines,
            endpoints,
        } in fragments
        {
            specs.extend(nodes);
            security_rules.extend(rules);
            pipelines.extend(fragment_pipelines);
            bindings.extend(endpoints);
        }

        let tags = serde_json::to_value(&config.tags)?;
        for spec in &mut specs {
            spec.attributes.insert(TAGS_ATTRIBUTE.to_string(), tags.clone());
        }

        let mut graph = ResourceGraph::from_specs(specs)?;
        for (from, to) in &ordering {
            graph.add_dependency(from, to)?;
        }
        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Resource graph assembled"
        );

        for pipeline in &mut pipelines {
            pipeline.validate()?;
        }

        let mut endpoints = EndpointRegistry::new();
        for (listener, endpoint) in bindings {
            endpoints.bind(listener, endpoint)?;
        }

        let nodes: Vec<ResourceNode> = graph.resolve_order().into_iter().cloned().collect();
        let layers: Vec<Vec<NodeId>> = graph
            .resolve_layers()
            .into_iter()
            .map(|layer| layer.into_iter().map(|node| node.id.clone()).collect())
            .collect();

        let plan = DeploymentPlan {
            id: Uuid::now_v7(),
            project: config.project.clone(),
            synthesized_at: Utc::now(),
            tags: config.tags.clone(),
            nodes,
            layers,
            security_rules,
            pipelines,
            endpoints,
        };

        info!(
            plan_id = %plan.id,
            project = %plan.project,
            nodes = plan.nodes.len(),
            layers = plan.layers.len(),
            rules = plan.security_rules.len(),
            pipelines = plan.pipelines.len(),
            endpoints = plan.endpoints.len(),
            "Deployment plan synthesized"
        );

        Ok(plan)
    }
}
