// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declarative Resource Kind Taxonomy
//!
//! The vocabulary of resource nodes that the composition root emits into
//! the deployment graph, abstracted away from any one cloud provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a declarative resource node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // Network
    /// Virtual network (address space)
    Network,
    /// Group of subnets of one tier across availability zones
    SubnetTier,
    /// Security boundary (rule principal)
    SecurityGroup,
    /// Internet-facing load balancer
    LoadBalancer,

    // Orchestration
    /// Managed container cluster
    ComputeCluster,
    /// Service-discovery namespace
    ServiceNamespace,
    /// Log destination
    LogDestination,

    // Workload
    /// Container image repository
    ContainerRepository,
    /// Container image build
    ImageBuild,
    /// Copy of a built image into a repository
    ImagePublish,
    /// Task definition (CPU, memory, containers)
    TaskDefinition,
    /// IAM-style policy statement
    PolicyStatement,
    /// Long-running service
    Service,
    /// Load balancer target group
    TargetGroup,
    /// Load balancer listener
    Listener,
    /// Autoscaling policy
    ScalingPolicy,

    // Delivery
    /// Artifact storage bucket
    ArtifactBucket,
    /// Build project used by a pipeline action
    BuildProject,
    /// Release pipeline
    Pipeline,
    /// One stage of a release pipeline
    PipelineStage,
}

/// High-level grouping of resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Network,
    Orchestration,
    Workload,
    Security,
    Observability,
    Delivery,
}

impl ResourceKind {
    /// All kinds, in declaration order
    pub const ALL: [ResourceKind; 20] = [
        Self::Network,
        Self::SubnetTier,
        Self::SecurityGroup,
        Self::LoadBalancer,
        Self::ComputeCluster,
        Self::ServiceNamespace,
        Self::LogDestination,
        Self::ContainerRepository,
        Self::ImageBuild,
        Self::ImagePublish,
        Self::TaskDefinition,
        Self::PolicyStatement,
        Self::Service,
        Self::TargetGroup,
        Self::Listener,
        Self::ScalingPolicy,
        Self::ArtifactBucket,
        Self::BuildProject,
        Self::Pipeline,
        Self::PipelineStage,
    ];

    /// Canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::SubnetTier => "subnet_tier",
            Self::SecurityGroup => "security_group",
            Self::LoadBalancer => "load_balancer",
            Self::ComputeCluster => "compute_cluster",
            Self::ServiceNamespace => "service_namespace",
            Self::LogDestination => "log_destination",
            Self::ContainerRepository => "container_repository",
            Self::ImageBuild => "image_build",
            Self::ImagePublish => "image_publish",
            Self::TaskDefinition => "task_definition",
            Self::PolicyStatement => "policy_statement",
            Self::Service => "service",
            Self::TargetGroup => "target_group",
            Self::Listener => "listener",
            Self::ScalingPolicy => "scaling_policy",
            Self::ArtifactBucket => "artifact_bucket",
            Self::BuildProject => "build_project",
            Self::Pipeline => "pipeline",
            Self::PipelineStage => "pipeline_stage",
        }
    }

    /// Parse from string representation, accepting a few common aliases
    pub fn parse(s: &str) -> Option<Self> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "network" | "vpc" => Self::Network,
            "subnet_tier" | "subnets" => Self::SubnetTier,
            "security_group" | "sg" => Self::SecurityGroup,
            "load_balancer" | "alb" | "lb" => Self::LoadBalancer,
            "compute_cluster" | "cluster" => Self::ComputeCluster,
            "service_namespace" | "namespace" => Self::ServiceNamespace,
            "log_destination" | "log_group" => Self::LogDestination,
            "container_repository" | "repository" | "ecr" => Self::ContainerRepository,
            "image_build" | "image_asset" => Self::ImageBuild,
            "image_publish" | "image_deployment" => Self::ImagePublish,
            "task_definition" | "task" => Self::TaskDefinition,
            "policy_statement" | "policy" => Self::PolicyStatement,
            "service" => Self::Service,
            "target_group" => Self::TargetGroup,
            "listener" => Self::Listener,
            "scaling_policy" | "autoscaling" => Self::ScalingPolicy,
            "artifact_bucket" | "bucket" => Self::ArtifactBucket,
            "build_project" => Self::BuildProject,
            "pipeline" => Self::Pipeline,
            "pipeline_stage" | "stage" => Self::PipelineStage,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Network => "Network",
            Self::SubnetTier => "Subnet Tier",
            Self::SecurityGroup => "Security Group",
            Self::LoadBalancer => "Load Balancer",
            Self::ComputeCluster => "Compute Cluster",
            Self::ServiceNamespace => "Service Namespace",
            Self::LogDestination => "Log Destination",
            Self::ContainerRepository => "Container Repository",
            Self::ImageBuild => "Image Build",
            Self::ImagePublish => "Image Publish",
            Self::TaskDefinition => "Task Definition",
            Self::PolicyStatement => "Policy Statement",
            Self::Service => "Service",
            Self::TargetGroup => "Target Group",
            Self::Listener => "Listener",
            Self::ScalingPolicy => "Scaling Policy",
            Self::ArtifactBucket => "Artifact Bucket",
            Self::BuildProject => "Build Project",
            Self::Pipeline => "Pipeline",
            Self::PipelineStage => "Pipeline Stage",
        }
    }

    /// Primary category for this kind
    pub fn category(&self) -> ResourceCategory {
        match self {
            Self::Network | Self::SubnetTier | Self::LoadBalancer => ResourceCategory::Network,

            Self::ComputeCluster | Self::ServiceNamespace => ResourceCategory::Orchestration,

            Self::ContainerRepository
            | Self::ImageBuild
            | Self::ImagePublish
            | Self::TaskDefinition
            | Self::Service
            | Self::TargetGroup
            | Self::Listener
            | Self::ScalingPolicy => ResourceCategory::Workload,

            Self::SecurityGroup | Self::PolicyStatement => ResourceCategory::Security,

            Self::LogDestination => ResourceCategory::Observability,

            Self::ArtifactBucket | Self::BuildProject | Self::Pipeline | Self::PipelineStage => {
                ResourceCategory::Delivery
            }
        }
    }

    /// Whether the kind can act as a security rule principal
    pub fn is_principal(&self) -> bool {
        matches!(self, Self::SecurityGroup)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Orchestration => "orchestration",
            Self::Workload => "workload",
            Self::Security => "security",
            Self::Observability => "observability",
            Self::Delivery => "delivery",
        };
        f.write_str(name)
    }
}
