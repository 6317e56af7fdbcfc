// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Definition
//!
//! One containerized service with everything it owns:
//!
//! - image repository, image build and the `:latest` publish step
//! - task definition with its role policies
//! - the service itself (capacity strategy, circuit breaker, service connect)
//! - optional public ingress (target group and listener)
//! - autoscaling policy
//! - a release pipeline (`Source → Build → Deploy`) with its own artifact
//!   bucket and build project
//!
//! The two services of the demo differ only in their [`ServiceSpec`]; see
//! [`ServiceSpec::backend`] and [`ServiceSpec::frontend`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::info;

use super::{
    node_name, ClusterHandles, ClusterSpec, Fragment, GroupHandle, NetworkHandles, NetworkSpec,
};
use crate::domain::invariants::{
    validate_capacity_weights, validate_desired_count, validate_port, validate_request_target,
    validate_task_size, validate_utilization_target,
};
use crate::domain::{Hostname, Protocol, ResourceKind};
use crate::endpoint::ServiceEndpoint;
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::graph::NodeSpec;
use crate::pipeline::{define_pipeline, Action, ActionKind, Stage};

/// Listener name under which service connect endpoints are bound
pub const SERVICE_CONNECT_LISTENER: &str = "service-connect";

/// A task role policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySpec {
    pub sid: String,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

impl PolicySpec {
    fn new(sid: &str, actions: &[&str], resources: &[&str]) -> Self {
        Self {
            sid: sid.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources: resources.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Container logging
    pub fn logs() -> Self {
        Self::new(
            "Logs",
            &["logs:CreateLogGroup", "logs:CreateLogStream", "logs:PutLogEvents"],
            &["*"],
        )
    }

    /// Foundation model invocation
    pub fn model_invocation() -> Self {
        Self::new(
            "ModelInvocation",
            &["bedrock:InvokeModel", "bedrock:InvokeModelWithResponseStream"],
            &["arn:aws:bedrock:*::foundation-model/*"],
        )
    }
}

/// Metric an autoscaling policy tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "metric", content = "target", rename_all = "snake_case")]
pub enum ScalingTarget {
    /// Average memory utilization percent
    MemoryUtilization(u32),
    /// Average CPU utilization percent
    CpuUtilization(u32),
    /// Requests per task behind the target group
    RequestsPerTarget(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingSpec {
    pub policy_name: String,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub target: ScalingTarget,
}

/// Port published into the service connect namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPort {
    pub port: u16,
    pub idle_timeout_secs: u64,
    pub per_request_timeout_secs: u64,
}

/// Public ingress through the shared load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressSpec {
    pub target_group_name: String,
    pub health_check_path: String,
    pub health_check_interval_secs: u64,
    pub health_check_timeout_secs: u64,
    pub stickiness_secs: u64,
    pub deregistration_delay_secs: u64,
    pub listener_port: u16,
}

/// Inputs of one service definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Node name prefix, e.g. `BackendApp`
    pub scope: String,
    /// Container, repository and task name, e.g. `backend-app`
    pub name: String,
    pub source_directory: String,
    pub cpu: u32,
    pub memory_mib: u32,
    pub container_port: u16,
    pub port_mapping_name: String,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    pub policies: Vec<PolicySpec>,
    /// Security group name the tasks run in
    pub security_group: String,
    pub desired_count: u32,
    /// (capacity provider, weight)
    pub capacity_providers: Vec<(String, u32)>,
    pub scaling: ScalingSpec,
    pub service_connect_log_prefix: String,
    pub published: Option<PublishedPort>,
    pub ingress: Option<IngressSpec>,
    pub build_project_name: String,
    pub build_log_prefix: String,
    pub pipeline_name: String,
    pub source_artifact: String,
    pub build_artifact: String,
    /// Scopes of services that must be running before this one starts
    #[serde(default)]
    pub after: Vec<String>,
}

impl ServiceSpec {
    /// Inference API service, reachable only inside the namespace
    pub fn backend(network: &NetworkSpec, _cluster: &ClusterSpec) -> Self {
        Self {
            scope: "BackendApp".to_string(),
            name: "backend-app".to_string(),
            source_directory: "src/apps/backend/".to_string(),
            cpu: 512,
            memory_mib: 1024,
            container_port: network.backend_port,
            port_mapping_name: "backend".to_string(),
            environment: BTreeMap::new(),
            policies: vec![PolicySpec::model_invocation(), PolicySpec::logs()],
            security_group: network.backend_group(),
            desired_count: 2,
            capacity_providers: default_capacity(),
            scaling: ScalingSpec {
                policy_name: "MemoryScaling".to_string(),
                min_capacity: 2,
                max_capacity: 10,
                target: ScalingTarget::MemoryUtilization(70),
            },
            service_connect_log_prefix: "sc-backend".to_string(),
            published: Some(PublishedPort {
                port: network.backend_port,
                idle_timeout_secs: 10 * 60,
                per_request_timeout_secs: 5 * 60,
            }),
            ingress: None,
            build_project_name: "GenAI-Backend-Build-Image-Definition".to_string(),
            build_log_prefix: "backend".to_string(),
            pipeline_name: "BackendAppPipeline".to_string(),
            source_artifact: "Source".to_string(),
            build_artifact: "Build".to_string(),
            after: Vec::new(),
        }
    }

    /// Prompt UI service, exposed through the load balancer
    pub fn frontend(network: &NetworkSpec, cluster: &ClusterSpec) -> Self {
        let name = "frontend-app";
        Self {
            scope: "FrontendApp".to_string(),
            name: name.to_string(),
            source_directory: "src/apps/frontend/".to_string(),
            cpu: 512,
            memory_mib: 1024,
            container_port: network.frontend_port,
            port_mapping_name: "frontend".to_string(),
            environment: BTreeMap::from([(
                "API_ENDPOINT".to_string(),
                format!("http://backend.{}:{}", cluster.namespace, network.backend_port),
            )]),
            policies: vec![PolicySpec::logs()],
            security_group: network.frontend_group(),
            desired_count: 2,
            capacity_providers: default_capacity(),
            scaling: ScalingSpec {
                policy_name: "RequestScaling".to_string(),
                min_capacity: 2,
                max_capacity: 10,
                target: ScalingTarget::RequestsPerTarget(70),
            },
            service_connect_log_prefix: "sc-frontend".to_string(),
            published: None,
            ingress: Some(IngressSpec {
                target_group_name: format!("{name}-tg"),
                health_check_path: "/_stcore/health".to_string(),
                health_check_interval_secs: 60,
                health_check_timeout_secs: 5,
                stickiness_secs: 10 * 60,
                deregistration_delay_secs: 60,
                listener_port: 80,
            }),
            build_project_name: "GenAI-Frontend-Build-Image-Definition".to_string(),
            build_log_prefix: "frontend".to_string(),
            pipeline_name: "FrontendAppPipeline".to_string(),
            source_artifact: "SourceArtifact".to_string(),
            build_artifact: "BuildArtifact".to_string(),
            after: vec!["BackendApp".to_string()],
        }
    }

    pub fn image_uri(&self) -> String {
        format!("{}:latest", self.name)
    }

    /// Node name of the running service
    pub fn service_node(&self) -> String {
        node_name(&self.scope, "Service")
    }

    fn validate(&self) -> InfrastructureResult<()> {
        validate_task_size(self.cpu, self.memory_mib)?;
        validate_port(self.container_port)?;
        validate_desired_count(
            self.desired_count,
            self.scaling.min_capacity,
            self.scaling.max_capacity,
        )?;
        validate_capacity_weights(&self.capacity_providers)?;
        match self.scaling.target {
            ScalingTarget::MemoryUtilization(percent) | ScalingTarget::CpuUtilization(percent) => {
                validate_utilization_target(percent)?
            }
            ScalingTarget::RequestsPerTarget(requests) => {
                validate_request_target(requests)?;
                if self.ingress.is_none() {
                    return Err(InfrastructureError::Configuration(format!(
                        "{}: request count scaling needs a load balancer target group",
                        self.scope
                    )));
                }
            }
        }
        if let Some(published) = &self.published {
            validate_port(published.port)?;
        }
        Ok(())
    }
}

fn default_capacity() -> Vec<(String, u32)> {
    vec![("FARGATE_SPOT".to_string(), 2), ("FARGATE".to_string(), 1)]
}

/// Handles a service definition consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceWiring {
    pub vpc: String,
    pub subnets: String,
    pub security_group: GroupHandle,
    pub cluster: ClusterHandles,
    /// (load balancer node, load balancer name), for services with ingress
    pub load_balancer: Option<(String, String)>,
}

impl ServiceWiring {
    pub fn new(
        network: &NetworkHandles,
        cluster: &ClusterHandles,
        spec: &ServiceSpec,
    ) -> InfrastructureResult<Self> {
        Ok(Self {
            vpc: network.vpc.clone(),
            subnets: network.private_subnets.clone(),
            security_group: network.group(&spec.security_group)?.clone(),
            cluster: cluster.clone(),
            load_balancer: spec.ingress.as_ref().map(|_| {
                (
                    network.load_balancer.clone(),
                    network.load_balancer_name.clone(),
                )
            }),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHandles {
    pub service: String,
    pub task_definition: String,
    pub target_group: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    pub fragment: Fragment,
    pub handles: ServiceHandles,
}

impl ServiceDefinition {
    pub fn define(spec: &ServiceSpec, wiring: &ServiceWiring) -> InfrastructureResult<Self> {
        spec.validate()?;

        let scope = spec.scope.as_str();
        let mut fragment = Fragment::new();

        // Image supply chain
        let repository = fragment.push(
            NodeSpec::new(node_name(scope, "Repository"), ResourceKind::ContainerRepository)
                .attr("repository_name", spec.name.as_str())
                .attr("removal_policy", "destroy")
                .attr("empty_on_delete", true),
        );
        let image = fragment.push(
            NodeSpec::new(node_name(scope, "Image"), ResourceKind::ImageBuild)
                .attr("directory", spec.source_directory.as_str())
                .attr("platform", "linux/amd64")
                .depends_on(&repository),
        );
        let publish = fragment.push(
            NodeSpec::new(node_name(scope, "ImagePublish"), ResourceKind::ImagePublish)
                .attr("destination", spec.image_uri())
                .with_ref("source", &image),
        );

        // Task definition and role
        let task_definition = fragment.push(
            NodeSpec::new(node_name(scope, "TaskDefinition"), ResourceKind::TaskDefinition)
                .attr("family", format!("{scope}TaskDef"))
                .attr("cpu", spec.cpu)
                .attr("memory_mib", spec.memory_mib)
                .attr("container", container(spec))
                .with_ref("image_repository", &repository)
                .with_ref("log_group", &wiring.cluster.container_log_group),
        );
        let policies: Vec<String> = spec
            .policies
            .iter()
            .map(|policy| {
                fragment.push(
                    NodeSpec::new(
                        node_name(scope, &format!("TaskRolePolicy/{}", policy.sid)),
                        ResourceKind::PolicyStatement,
                    )
                    .attr("effect", "Allow")
                    .attr("actions", json!(policy.actions))
                    .attr("resources", json!(policy.resources))
                    .with_ref("task_definition", &task_definition),
                )
            })
            .collect();

        // Running service
        let mut service_spec = NodeSpec::new(spec.service_node(), ResourceKind::Service)
            .attr("service_name", format!("{scope}Service"))
            .attr("desired_count", spec.desired_count)
            .attr("deployment_controller", "ECS")
            .attr("circuit_breaker", json!({ "enable": true, "rollback": true }))
            .attr("capacity_provider_strategies", capacity_strategies(spec))
            .attr("service_connect", service_connect(spec))
            .with_ref("cluster", &wiring.cluster.cluster)
            .with_ref("task_definition", &task_definition)
            .with_ref("subnets", &wiring.subnets)
            .with_ref("security_group", &wiring.security_group.node)
            .with_ref("namespace", &wiring.cluster.namespace)
            .depends_on(&publish);
        for policy in &policies {
            service_spec = service_spec.depends_on(policy);
        }
        let service = fragment.push(service_spec);

        // Public ingress
        let target_group = match (&spec.ingress, &wiring.load_balancer) {
            (Some(ingress), Some((lb_node, lb_name))) => Some(define_ingress(
                &mut fragment,
                spec,
                wiring,
                ingress,
                &service,
                lb_node,
                lb_name,
            )?),
            (Some(_), None) => {
                return Err(InfrastructureError::Configuration(format!(
                    "{scope}: ingress declared without a load balancer"
                )))
            }
            _ => None,
        };

        // Autoscaling
        let mut scaling = NodeSpec::new(node_name(scope, "Scaling"), ResourceKind::ScalingPolicy)
            .attr("policy_name", spec.scaling.policy_name.as_str())
            .attr("min_capacity", spec.scaling.min_capacity)
            .attr("max_capacity", spec.scaling.max_capacity)
            .attr("target", json!(spec.scaling.target))
            .with_ref("service", &service);
        if let (ScalingTarget::RequestsPerTarget(_), Some(tg)) =
            (&spec.scaling.target, &target_group)
        {
            scaling = scaling.with_ref("target_group", tg);
        }
        fragment.push(scaling);

        if let Some(published) = &spec.published {
            let host =
                Hostname::in_namespace(&spec.port_mapping_name, &wiring.cluster.namespace_name)?;
            fragment.endpoints.push((
                SERVICE_CONNECT_LISTENER.to_string(),
                ServiceEndpoint::new(host, published.port, Protocol::Tcp, spec.name.as_str()),
            ));
        }

        define_release(&mut fragment, spec, wiring, &repository, &service);

        info!(
            scope,
            service = %spec.name,
            nodes = fragment.nodes.len(),
            endpoints = fragment.endpoints.len(),
            "Service defined"
        );

        Ok(Self {
            fragment,
            handles: ServiceHandles {
                service,
                task_definition,
                target_group,
            },
        })
    }
}

fn container(spec: &ServiceSpec) -> Value {
    json!({
        "name": spec.name,
        "image": spec.image_uri(),
        "port_mappings": [{
            "name": spec.port_mapping_name,
            "container_port": spec.container_port,
            "host_port": spec.container_port,
            "protocol": Protocol::Tcp,
            "app_protocol": "http",
        }],
        "environment": spec.environment,
        "logging": {
            "stream_prefix": "service",
            "mode": "non-blocking",
            "max_buffer_mib": 25,
        },
    })
}

fn capacity_strategies(spec: &ServiceSpec) -> Value {
    spec.capacity_providers
        .iter()
        .map(|(provider, weight)| json!({ "capacity_provider": provider, "weight": weight }))
        .collect()
}

fn service_connect(spec: &ServiceSpec) -> Value {
    let services: Vec<Value> = spec
        .published
        .iter()
        .map(|published| {
            json!({
                "port_mapping_name": spec.port_mapping_name,
                "port": published.port,
                "idle_timeout_secs": published.idle_timeout_secs,
                "per_request_timeout_secs": published.per_request_timeout_secs,
            })
        })
        .collect();
    json!({
        "log_stream_prefix": spec.service_connect_log_prefix,
        "services": services,
    })
}

fn define_ingress(
    fragment: &mut Fragment,
    spec: &ServiceSpec,
    wiring: &ServiceWiring,
    ingress: &IngressSpec,
    service: &str,
    lb_node: &str,
    lb_name: &str,
) -> InfrastructureResult<String> {
    let scope = spec.scope.as_str();

    let target_group = fragment.push(
        NodeSpec::new(node_name(scope, "TargetGroup"), ResourceKind::TargetGroup)
            .attr("target_group_name", ingress.target_group_name.as_str())
            .attr("port", spec.container_port)
            .attr("protocol", "HTTP")
            .attr(
                "health_check",
                json!({
                    "path": ingress.health_check_path,
                    "interval_secs": ingress.health_check_interval_secs,
                    "timeout_secs": ingress.health_check_timeout_secs,
                }),
            )
            .attr("stickiness_cookie_secs", ingress.stickiness_secs)
            .attr("deregistration_delay_secs", ingress.deregistration_delay_secs)
            .attr("cross_zone_enabled", true)
            .with_ref("vpc", &wiring.vpc)
            .with_ref("targets", service),
    );

    fragment.push(
        NodeSpec::new(node_name(scope, "Listener"), ResourceKind::Listener)
            .attr("port", ingress.listener_port)
            .attr("protocol", "HTTP")
            .with_ref("load_balancer", lb_node)
            .with_ref("default_target_group", &target_group),
    );

    fragment.endpoints.push((
        lb_node.to_string(),
        ServiceEndpoint::new(
            Hostname::new(lb_name)?,
            ingress.listener_port,
            Protocol::Tcp,
            spec.name.as_str(),
        ),
    ));

    Ok(target_group)
}

fn define_release(
    fragment: &mut Fragment,
    spec: &ServiceSpec,
    wiring: &ServiceWiring,
    repository: &str,
    service: &str,
) {
    let scope = spec.scope.as_str();
    let pipeline_scope = node_name(scope, "Pipeline");

    let bucket = fragment.push(
        NodeSpec::new(node_name(scope, "ArtifactBucket"), ResourceKind::ArtifactBucket)
            .attr("bucket_name", format!("{scope}ArtifactBucket"))
            .attr("removal_policy", "destroy")
            .attr("auto_delete_objects", true)
            .attr("enforce_ssl", true),
    );
    let project = fragment.push(
        NodeSpec::new(node_name(scope, "BuildProject"), ResourceKind::BuildProject)
            .attr("project_name", spec.build_project_name.as_str())
            .attr("build_image", "AMAZON_LINUX_2_5")
            .attr("build_spec", "buildspec.yml")
            .attr("log_prefix", spec.build_log_prefix.as_str())
            .with_ref("log_group", &wiring.cluster.build_log_group),
    );

    let stages = [
        ("Source", "repository", repository),
        ("Build", "project", project.as_str()),
        ("Deploy", "service", service),
    ]
    .map(|(stage, key, target)| {
        fragment.push(
            NodeSpec::new(node_name(&pipeline_scope, stage), ResourceKind::PipelineStage)
                .attr("stage_name", stage)
                .with_ref(key, target),
        )
    });

    let mut pipeline_node = NodeSpec::new(pipeline_scope.as_str(), ResourceKind::Pipeline)
        .attr("pipeline_name", spec.pipeline_name.as_str())
        .attr("pipeline_type", "V2")
        .with_ref("artifact_bucket", &bucket);
    for stage in &stages {
        pipeline_node = pipeline_node.depends_on(stage);
    }
    fragment.push(pipeline_node);

    fragment.pipelines.push(define_pipeline(
        spec.pipeline_name.as_str(),
        vec![
            Stage::new("Source").action(
                Action::new("Source", ActionKind::Source)
                    .output(spec.source_artifact.as_str())
                    .config("repository", spec.name.as_str())
                    .config("image_tag", "latest"),
            ),
            Stage::new("Build").action(
                Action::new("Build", ActionKind::Build)
                    .input(spec.source_artifact.as_str())
                    .output(spec.build_artifact.as_str())
                    .config("project", spec.build_project_name.as_str())
                    .config("environment", json!({ "ContainerName": spec.name })),
            ),
            Stage::new("Deploy").action(
                Action::new("Deploy", ActionKind::Deploy)
                    .input(spec.build_artifact.as_str())
                    .config("service", format!("{scope}Service")),
            ),
        ],
    ));
}
