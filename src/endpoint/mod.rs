// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service endpoints and listener bindings

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::domain::{Hostname, Protocol};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("{host}:{port} is already bound on listener {listener} (task {existing})")]
    DuplicateBinding {
        listener: String,
        host: String,
        port: u16,
        existing: String,
    },
}

/// (host, port, protocol) bound to a named task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub host: Hostname,
    pub port: u16,
    pub protocol: Protocol,
    pub task: String,
}

impl ServiceEndpoint {
    pub fn new(host: Hostname, port: u16, protocol: Protocol, task: impl Into<String>) -> Self {
        Self {
            host,
            port,
            protocol,
            task: task.into(),
        }
    }

    /// `http://host:port`, the form service discovery clients dial
    pub fn url(&self, scheme: &str) -> String {
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{} ({})", self.host, self.port, self.protocol, self.task)
    }
}

/// Endpoints grouped by listener; (host, port) is unique per listener
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointRegistry {
    listeners: BTreeMap<String, Vec<ServiceEndpoint>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(
        &mut self,
        listener: impl Into<String>,
        endpoint: ServiceEndpoint,
    ) -> Result<&ServiceEndpoint, EndpointError> {
        let listener = listener.into();
        let bound = self.listeners.entry(listener.clone()).or_default();

        if let Some(existing) = bound
            .iter()
            .find(|e| e.host == endpoint.host && e.port == endpoint.port)
        {
            return Err(EndpointError::DuplicateBinding {
                listener,
                host: endpoint.host.to_string(),
                port: endpoint.port,
                existing: existing.task.clone(),
            });
        }

        debug!(listener = %listener, endpoint = %endpoint, "Endpoint bound");
        bound.push(endpoint);
        Ok(&bound[bound.len() - 1])
    }

    pub fn endpoints(&self, listener: &str) -> &[ServiceEndpoint] {
        self.listeners
            .get(listener)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First endpoint bound for `task` on any listener
    pub fn find_task(&self, task: &str) -> Option<&ServiceEndpoint> {
        self.iter().map(|(_, e)| e).find(|e| e.task == task)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServiceEndpoint)> {
        self.listeners
            .iter()
            .flat_map(|(listener, eps)| eps.iter().map(move |e| (listener.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
