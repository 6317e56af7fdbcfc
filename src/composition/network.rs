// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network definition: VPC, subnet tiers, security groups, load balancer

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use tracing::info;

use super::{node_name, Fragment};
use crate::domain::{Cidr, Protocol, ResourceKind, ValidationError};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::graph::NodeSpec;
use crate::security::Principal;

/// Inputs of the network definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Node name prefix
    pub scope: String,
    /// Prefix of security group names
    pub project: String,
    pub vpc_cidr: Cidr,
    pub max_azs: u8,
    pub nat_gateways: u8,
    pub subnet_mask: u8,
    pub load_balancer_name: String,
    /// Port the load balancer accepts from the internet
    pub public_port: u16,
    /// Port the frontend tasks accept from the load balancer
    pub frontend_port: u16,
    /// Port the backend tasks accept from the frontend
    pub backend_port: u16,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        Self {
            scope: "Networking".to_string(),
            project: "GenAIDemo".to_string(),
            vpc_cidr: Cidr::ipv4(Ipv4Addr::new(10, 0, 0, 0), 16),
            max_azs: 3,
            nat_gateways: 3,
            subnet_mask: 24,
            load_balancer_name: "genai-demo-alb".to_string(),
            public_port: 443,
            frontend_port: 8501,
            backend_port: 8080,
        }
    }
}

impl NetworkSpec {
    pub fn alb_group(&self) -> String {
        format!("{}-ALB-SG", self.project)
    }

    pub fn frontend_group(&self) -> String {
        format!("{}-FrontendService-SG", self.project)
    }

    pub fn backend_group(&self) -> String {
        format!("{}-BackendService-SG", self.project)
    }
}

/// A security group node and the principal rules refer to it by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHandle {
    pub node: String,
    pub principal: Principal,
}

impl GroupHandle {
    fn new(node: String, group_name: String) -> Self {
        Self {
            node,
            principal: Principal::Group(group_name),
        }
    }
}

/// What later definitions need from the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHandles {
    pub vpc: String,
    pub public_subnets: String,
    pub private_subnets: String,
    pub load_balancer: String,
    pub load_balancer_name: String,
    groups: BTreeMap<String, GroupHandle>,
}

impl NetworkHandles {
    /// Look up a security group by its group name
    pub fn group(&self, name: &str) -> InfrastructureResult<&GroupHandle> {
        self.groups
            .get(name)
            .ok_or_else(|| {
                InfrastructureError::Configuration(format!("unknown security group {name}"))
            })
    }
}

/// Network fragment and its handles
#[derive(Debug, Clone)]
pub struct NetworkDefinition {
    pub fragment: Fragment,
    pub handles: NetworkHandles,
}

impl NetworkDefinition {
    pub fn define(spec: &NetworkSpec) -> InfrastructureResult<Self> {
        if spec.max_azs == 0 {
            return Err(
                ValidationError::BusinessRule("at least one availability zone".into()).into(),
            );
        }
        if spec.nat_gateways > spec.max_azs {
            return Err(ValidationError::BusinessRule(format!(
                "{} NAT gateways for {} availability zones",
                spec.nat_gateways, spec.max_azs
            ))
            .into());
        }

        let scope = spec.scope.as_str();
        let mut fragment = Fragment::new();

        let vpc = fragment.push(
            NodeSpec::new(node_name(scope, "Vpc"), ResourceKind::Network)
                .attr("cidr_block", spec.vpc_cidr.to_string())
                .attr("max_azs", spec.max_azs)
                .attr("enable_dns_hostnames", true)
                .attr("enable_dns_support", true),
        );

        let azs = u32::from(spec.max_azs);
        let public_blocks = carve(&spec.vpc_cidr, spec.subnet_mask, 0..azs)?;
        let private_blocks = carve(&spec.vpc_cidr, spec.subnet_mask, azs..2 * azs)?;

        let public_subnets = fragment.push(
            NodeSpec::new(node_name(scope, "PublicSubnets"), ResourceKind::SubnetTier)
                .attr("tier", "Public")
                .attr("subnet_type", "PUBLIC")
                .attr("cidr_mask", spec.subnet_mask)
                .attr("cidr_blocks", public_blocks)
                .attr("nat_gateways", spec.nat_gateways)
                .with_ref("vpc", &vpc),
        );
        let private_subnets = fragment.push(
            NodeSpec::new(node_name(scope, "PrivateSubnets"), ResourceKind::SubnetTier)
                .attr("tier", "Private")
                .attr("subnet_type", "PRIVATE_WITH_EGRESS")
                .attr("cidr_mask", spec.subnet_mask)
                .attr("cidr_blocks", private_blocks)
                .with_ref("vpc", &vpc)
                // egress goes through the public tier's NAT gateways
                .depends_on(&public_subnets),
        );

        let alb = GroupHandle::new(
            fragment.push(group_node(spec, &vpc, "AlbSecurityGroup", "ALB", false)),
            spec.alb_group(),
        );
        let frontend = GroupHandle::new(
            fragment.push(
                group_node(spec, &vpc, "FrontendSecurityGroup", "FrontendService", true)
                    .with_ref("ingress_peer", &alb.node),
            ),
            spec.frontend_group(),
        );
        let backend = GroupHandle::new(
            fragment.push(
                group_node(spec, &vpc, "BackendSecurityGroup", "BackendService", true)
                    .with_ref("ingress_peer", &frontend.node),
            ),
            spec.backend_group(),
        );

        fragment
            .rules
            .add_rule(
                Principal::AnyIpv4,
                alb.principal.clone(),
                spec.public_port,
                Protocol::Tcp,
            )
            .add_rule(
                alb.principal.clone(),
                Principal::AnyIpv4,
                spec.public_port,
                Protocol::Tcp,
            )
            .add_rule(
                alb.principal.clone(),
                frontend.principal.clone(),
                spec.frontend_port,
                Protocol::Tcp,
            )
            .add_rule(
                frontend.principal.clone(),
                backend.principal.clone(),
                spec.backend_port,
                Protocol::Tcp,
            )
            .allow_all_outbound(frontend.principal.clone())
            .allow_all_outbound(backend.principal.clone());

        let load_balancer = fragment.push(
            NodeSpec::new(node_name(scope, "LoadBalancer"), ResourceKind::LoadBalancer)
                .attr("load_balancer_name", spec.load_balancer_name.as_str())
                .attr("internet_facing", true)
                .attr("cross_zone_enabled", true)
                .with_ref("vpc", &vpc)
                .with_ref("subnets", &public_subnets)
                .with_ref("security_group", &alb.node),
        );

        info!(
            scope,
            cidr = %spec.vpc_cidr,
            azs = spec.max_azs,
            nodes = fragment.nodes.len(),
            rules = fragment.rules.len(),
            "Network defined"
        );

        let groups = [
            (spec.alb_group(), alb),
            (spec.frontend_group(), frontend),
            (spec.backend_group(), backend),
        ]
        .into_iter()
        .collect();

        Ok(Self {
            fragment,
            handles: NetworkHandles {
                vpc,
                public_subnets,
                private_subnets,
                load_balancer,
                load_balancer_name: spec.load_balancer_name.clone(),
                groups,
            },
        })
    }
}

fn carve(
    vpc: &Cidr,
    mask: u8,
    indices: std::ops::Range<u32>,
) -> InfrastructureResult<serde_json::Value> {
    let blocks = indices
        .map(|i| vpc.subnet(mask, i).map(|block| block.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!(blocks))
}

fn group_node(
    spec: &NetworkSpec,
    vpc: &str,
    resource: &str,
    component: &str,
    allow_all_outbound: bool,
) -> NodeSpec {
    NodeSpec::new(node_name(&spec.scope, resource), ResourceKind::SecurityGroup)
        .attr("security_group_name", format!("{}-{component}-SG", spec.project))
        .attr("description", format!("{}/{component}/SecurityGroup", spec.project))
        .attr("allow_all_outbound", allow_all_outbound)
        .with_ref("vpc", vpc)
}
