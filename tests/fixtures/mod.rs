// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for genai-infra
//!
//! Deterministic configurations and an in-memory inference backend.
//! Fixtures never read the process environment.

#![allow(dead_code)]

use genai_infra::composition::{ClusterSpec, NetworkSpec, ServiceSpec};
use genai_infra::config::default_tags;
use genai_infra::DeploymentConfig;
use std::collections::HashMap;

/// Variable lookup backed by fixed pairs
pub fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

/// The demo deployment with every default
pub fn demo_config() -> DeploymentConfig {
    DeploymentConfig::default()
}

/// The demo deployment with the frontend declared before the backend
pub fn frontend_first_config() -> DeploymentConfig {
    let mut config = DeploymentConfig::default();
    config.services.reverse();
    config
}

/// Backend only; no load balancer target
pub fn backend_only_config() -> DeploymentConfig {
    let network = NetworkSpec::default();
    let cluster = ClusterSpec::default();
    let backend = ServiceSpec::backend(&network, &cluster);
    DeploymentConfig {
        project: network.project.clone(),
        network,
        cluster,
        services: vec![backend],
        tags: default_tags(),
    }
}

#[cfg(feature = "server")]
pub mod inference {
    use async_trait::async_trait;
    use genai_infra::api::{InferenceClient, InferenceError};
    use std::sync::Mutex;

    /// Answers with a canned reply and records every instruction
    pub struct CannedInference {
        reply: Result<String, InferenceError>,
        seen: Mutex<Vec<String>>,
    }

    impl CannedInference {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(status: u16, message: &str) -> Self {
            Self {
                reply: Err(InferenceError::Upstream {
                    status,
                    message: message.to_string(),
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InferenceClient for CannedInference {
        async fn converse(&self, instruction: &str) -> Result<String, InferenceError> {
            self.seen.lock().unwrap().push(instruction.to_string());
            self.reply.clone()
        }
    }
}
