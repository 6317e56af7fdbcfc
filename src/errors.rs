//! Error types for topology construction

use thiserror::Error;

use crate::domain::{HostnameError, NetworkError, ValidationError};
use crate::endpoint::EndpointError;
use crate::graph::GraphError;
use crate::pipeline::PipelineError;

/// Errors that can occur while composing a deployment plan
///
/// Every variant is fatal: synthesis aborts and no partial plan is emitted.
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// Resource graph error (duplicate/unknown node, cycle)
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Pipeline validation or lifecycle error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Endpoint binding error
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// Network value object error
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Hostname value object error
    #[error(transparent)]
    Hostname(#[from] HostnameError),

    /// Domain rule violation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}
