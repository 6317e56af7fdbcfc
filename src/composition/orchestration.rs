// Copyright (c) 2025 - Cowboy AI, Inc.
//! Orchestration definition: compute cluster, service namespace, log groups

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{node_name, Fragment, NetworkHandles};
use crate::domain::{Hostname, ResourceKind, ValidationError};
use crate::errors::InfrastructureResult;
use crate::graph::NodeSpec;

/// Inputs of the orchestration definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub scope: String,
    pub project: String,
    pub cluster_name: String,
    /// Private DNS namespace used for service connect
    pub namespace: String,
    pub container_insights: bool,
    pub log_retention_days: u32,
}

impl Default for ClusterSpec {
    fn default() -> Self {
        Self {
            scope: "Containers".to_string(),
            project: "GenAIDemo".to_string(),
            cluster_name: "genai-demo-cluster".to_string(),
            namespace: "genai.demo".to_string(),
            container_insights: true,
            log_retention_days: 7,
        }
    }
}

/// What service definitions need from the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterHandles {
    pub cluster: String,
    pub namespace: String,
    /// Namespace domain, e.g. `genai.demo`
    pub namespace_name: String,
    pub container_log_group: String,
    pub build_log_group: String,
}

#[derive(Debug, Clone)]
pub struct OrchestrationDefinition {
    pub fragment: Fragment,
    pub handles: ClusterHandles,
}

impl OrchestrationDefinition {
    pub fn define(spec: &ClusterSpec, network: &NetworkHandles) -> InfrastructureResult<Self> {
        // the namespace must be usable as a DNS suffix
        Hostname::new(spec.namespace.as_str())?;
        if spec.log_retention_days == 0 {
            return Err(
                ValidationError::BusinessRule("log retention must be positive".into()).into(),
            );
        }

        let scope = spec.scope.as_str();
        let mut fragment = Fragment::new();

        let cluster = fragment.push(
            NodeSpec::new(node_name(scope, "Cluster"), ResourceKind::ComputeCluster)
                .attr("cluster_name", spec.cluster_name.as_str())
                .attr("container_insights", spec.container_insights)
                .attr("capacity_providers", serde_json::json!(["FARGATE", "FARGATE_SPOT"]))
                .with_ref("vpc", &network.vpc),
        );

        let namespace = fragment.push(
            NodeSpec::new(node_name(scope, "Namespace"), ResourceKind::ServiceNamespace)
                .attr("name", spec.namespace.as_str())
                .attr("namespace_type", "HTTP")
                .attr("use_for_service_connect", true)
                .with_ref("cluster", &cluster),
        );

        let container_log_group = fragment.push(log_group(
            scope,
            "ContainerLogGroup",
            format!("/aws/ecs/{}/containers", spec.project),
            spec.log_retention_days,
        ));
        let build_log_group = fragment.push(log_group(
            scope,
            "BuildImageDefLogGroup",
            format!("/aws/codebuild/{}/Build-Image-Definition", spec.project),
            spec.log_retention_days,
        ));

        info!(
            scope,
            cluster = %spec.cluster_name,
            namespace = %spec.namespace,
            "Orchestration defined"
        );

        Ok(Self {
            fragment,
            handles: ClusterHandles {
                cluster,
                namespace,
                namespace_name: spec.namespace.clone(),
                container_log_group,
                build_log_group,
            },
        })
    }
}

fn log_group(
    scope: &str,
    resource: &str,
    log_group_name: String,
    retention_days: u32,
) -> NodeSpec {
    NodeSpec::new(node_name(scope, resource), ResourceKind::LogDestination)
        .attr("log_group_name", log_group_name)
        .attr("retention_days", retention_days)
        .attr("removal_policy", "destroy")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{NetworkDefinition, NetworkSpec};

    fn network() -> NetworkHandles {
        NetworkDefinition::define(&NetworkSpec::default())
            .unwrap()
            .handles
    }

    #[test]
    fn test_default_orchestration() {
        let orchestration =
            OrchestrationDefinition::define(&ClusterSpec::default(), &network()).unwrap();

        let cluster = &orchestration.fragment.nodes[0];
        assert_eq!(cluster.name(), "Containers/Cluster");
        assert_eq!(cluster.dependencies(), ["Networking/Vpc"]);

        let log_names: Vec<_> = orchestration.fragment.nodes[2..]
            .iter()
            .map(|n| n.attributes["log_group_name"].as_str().unwrap())
            .collect();
        assert_eq!(
            log_names,
            vec![
                "/aws/ecs/GenAIDemo/containers",
                "/aws/codebuild/GenAIDemo/Build-Image-Definition"
            ]
        );
        assert_eq!(orchestration.handles.namespace_name, "genai.demo");
    }

    #[test]
    fn test_invalid_namespace() {
        let spec = ClusterSpec {
            namespace: "genai demo".to_string(),
            ..ClusterSpec::default()
        };
        assert!(OrchestrationDefinition::define(&spec, &network()).is_err());
    }
}
