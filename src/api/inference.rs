// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inference Client
//!
//! Converse-style text generation behind a trait, so the HTTP handlers can
//! be exercised against an in-memory implementation.
//!
//! # Wire format
//!
//! ```text
//! POST {endpoint}/model/{model_id}/converse
//! {
//!   "messages": [{ "role": "user", "content": [{ "text": "<instruction>" }] }],
//!   "system":   [{ "text": "Respond only in Korean" }]
//! }
//!
//! 200 → { "output": { "message": { "role": "assistant", "content": [{ "text": "..." }, ...] } } }
//! 4xx/5xx → { "message": "<reason>" }
//! ```
//!
//! The reply text is every content text joined with `\n`. No retries and no
//! streaming.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::InferenceConfig;

/// Errors talking to the hosted text-generation API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("Inference client configuration error: {0}")]
    Configuration(String),

    #[error("Inference request failed: {0}")]
    Transport(String),

    #[error("Inference API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Malformed inference response: {0}")]
    MalformedResponse(String),
}

/// A single-turn text generation backend
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Send one user instruction and return the reply text
    async fn converse(&self, instruction: &str) -> Result<String, InferenceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverseRequest {
    pub messages: Vec<Message>,
    pub system: Vec<ContentBlock>,
}

impl ConverseRequest {
    pub fn new(instruction: &str, system_prompt: &str) -> Self {
        Self {
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![ContentBlock::text(instruction)],
            }],
            system: vec![ContentBlock::text(system_prompt)],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverseResponse {
    pub output: ConverseOutput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverseOutput {
    pub message: Message,
}

impl ConverseResponse {
    /// Content texts joined with newlines
    pub fn text(&self) -> String {
        self.output
            .message
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    message: String,
}

/// [`InferenceClient`] over HTTP with reqwest
pub struct HttpInferenceClient {
    config: InferenceConfig,
    client: Client,
}

impl HttpInferenceClient {
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        info!(
            endpoint = %config.endpoint,
            model = %config.model_id,
            "Configuring inference client"
        );

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {key}").parse().map_err(|e| {
                    InferenceError::Configuration(format!("Invalid API key: {e}"))
                })?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                InferenceError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }

    pub fn converse_url(&self) -> String {
        format!(
            "{}/model/{}/converse",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model_id
        )
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn converse(&self, instruction: &str) -> Result<String, InferenceError> {
        let request = ConverseRequest::new(instruction, &self.config.system_prompt);
        let url = self.converse_url();

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            warn!(%status, %message, "Inference API call failed");
            return Err(InferenceError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ConverseResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

        let text = reply.text();
        debug!(chars = text.len(), "Inference reply received");
        Ok(text)
    }
}
