// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration
//!
//! Plain structs with defaults matching the demo deployment. Every loader
//! reads `GENAI_*` environment variables through a lookup function so the
//! parsing can be exercised without touching the process environment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::composition::{ClusterSpec, NetworkSpec, ServiceSpec};
use crate::domain::Cidr;
use crate::errors::{InfrastructureError, InfrastructureResult};

/// Default model for the prompt endpoint
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

/// Default inference region
pub const DEFAULT_REGION: &str = "ap-northeast-2";

/// System prompt sent with every instruction
pub const DEFAULT_SYSTEM_PROMPT: &str = "Respond only in Korean";

/// Tags applied to every resource of the deployment
pub fn default_tags() -> BTreeMap<String, String> {
    BTreeMap::from([("Project".to_string(), "genai-demo".to_string())])
}

/// Everything needed to synthesize a deployment plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub project: String,
    pub network: NetworkSpec,
    pub cluster: ClusterSpec,
    pub services: Vec<ServiceSpec>,
    #[serde(default = "default_tags")]
    pub tags: BTreeMap<String, String>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self::with_specs(NetworkSpec::default(), ClusterSpec::default())
    }
}

impl DeploymentConfig {
    /// Backend and frontend services wired to the given network and cluster
    pub fn with_specs(network: NetworkSpec, cluster: ClusterSpec) -> Self {
        let services = vec![
            ServiceSpec::backend(&network, &cluster),
            ServiceSpec::frontend(&network, &cluster),
        ];
        Self {
            project: network.project.clone(),
            network,
            cluster,
            services,
            tags: default_tags(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> InfrastructureResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// Recognized variables: `GENAI_PROJECT`, `GENAI_VPC_CIDR`,
    /// `GENAI_MAX_AZS`, `GENAI_NAT_GATEWAYS`, `GENAI_CLUSTER_NAME`,
    /// `GENAI_NAMESPACE`, `GENAI_LOG_RETENTION_DAYS` and `GENAI_TAGS`
    /// (`Key=Value,Key=Value`, merged over the default `Project` tag).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> InfrastructureResult<Self> {
        let mut network = NetworkSpec::default();
        let mut cluster = ClusterSpec::default();

        if let Some(project) = lookup("GENAI_PROJECT") {
            network.project = project.clone();
            cluster.project = project;
        }
        if let Some(cidr) = lookup("GENAI_VPC_CIDR") {
            network.vpc_cidr = Cidr::new(&cidr)?;
        }
        if let Some(azs) = lookup("GENAI_MAX_AZS") {
            network.max_azs = parse("GENAI_MAX_AZS", &azs)?;
            network.nat_gateways = network.nat_gateways.min(network.max_azs);
        }
        if let Some(nat) = lookup("GENAI_NAT_GATEWAYS") {
            network.nat_gateways = parse("GENAI_NAT_GATEWAYS", &nat)?;
        }
        if let Some(name) = lookup("GENAI_CLUSTER_NAME") {
            cluster.cluster_name = name;
        }
        if let Some(namespace) = lookup("GENAI_NAMESPACE") {
            cluster.namespace = namespace;
        }
        if let Some(days) = lookup("GENAI_LOG_RETENTION_DAYS") {
            cluster.log_retention_days = parse("GENAI_LOG_RETENTION_DAYS", &days)?;
        }

        let mut config = Self::with_specs(network, cluster);
        if let Some(tags) = lookup("GENAI_TAGS") {
            config.tags.extend(parse_tags(&tags)?);
        }
        Ok(config)
    }
}

fn parse_tags(value: &str) -> InfrastructureResult<BTreeMap<String, String>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, tag)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), tag.trim().to_string()))
            }
            _ => Err(InfrastructureError::Configuration(format!(
                "GENAI_TAGS: invalid tag {pair:?}, expected Key=Value"
            ))),
        })
        .collect()
}

/// Hosted text-generation API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the runtime API
    pub endpoint: String,
    pub region: String,
    pub model_id: String,
    pub system_prompt: String,
    /// Bearer token, if the endpoint requires one
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: runtime_endpoint(DEFAULT_REGION),
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

fn runtime_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

/// API server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub inference: InferenceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            inference: InferenceConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> InfrastructureResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Recognized variables: `GENAI_BIND_ADDR`, `GENAI_REGION`,
    /// `GENAI_MODEL_ID`, `GENAI_INFERENCE_URL`, `GENAI_INFERENCE_API_KEY`,
    /// `GENAI_INFERENCE_TIMEOUT_SECS`, `GENAI_SYSTEM_PROMPT`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> InfrastructureResult<Self> {
        let defaults = InferenceConfig::default();
        let region = lookup("GENAI_REGION").unwrap_or(defaults.region);
        let timeout_secs = match lookup("GENAI_INFERENCE_TIMEOUT_SECS") {
            Some(value) => parse("GENAI_INFERENCE_TIMEOUT_SECS", &value)?,
            None => defaults.timeout_secs,
        };

        Ok(Self {
            bind_addr: lookup("GENAI_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            inference: InferenceConfig {
                endpoint: lookup("GENAI_INFERENCE_URL")
                    .unwrap_or_else(|| runtime_endpoint(&region)),
                model_id: lookup("GENAI_MODEL_ID").unwrap_or(defaults.model_id),
                system_prompt: lookup("GENAI_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
                api_key: lookup("GENAI_INFERENCE_API_KEY"),
                region,
                timeout_secs,
            },
        })
    }
}

/// Prompt form client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the prompt API, e.g. `http://backend.genai.demo:8080`
    pub api_endpoint: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "http://backend.genai.demo:8080".to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads `GENAI_API_ENDPOINT`, falling back to the container's `API_ENDPOINT`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_endpoint = lookup("GENAI_API_ENDPOINT")
            .or_else(|| lookup("API_ENDPOINT"))
            .unwrap_or_else(|| Self::default().api_endpoint);
        Self { api_endpoint }
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> InfrastructureResult<T> {
    value.trim().parse().map_err(|_| {
        InfrastructureError::Configuration(format!("{key}: invalid value {value:?}"))
    })
}
