// Copyright (c) 2025 - Cowboy AI, Inc.
//! Prompt form client
//!
//! Client side of `POST /api/prompt`. The instruction is checked before
//! anything goes over the wire: an empty instruction is answered locally
//! with [`EMPTY_INSTRUCTION_MESSAGE`] and no request is sent.

use reqwest::Client;
use tracing::debug;

use super::routes::{Answer, UserPrompt};
use crate::config::ClientConfig;

/// Shown when the form is submitted without an instruction
pub const EMPTY_INSTRUCTION_MESSAGE: &str = "질문을 입력하세요.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("{}", EMPTY_INSTRUCTION_MESSAGE)]
    EmptyInstruction,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Check an instruction before sending it
pub fn validate_instruction(instruction: &str) -> Result<&str, PromptError> {
    if instruction.is_empty() {
        return Err(PromptError::EmptyInstruction);
    }
    Ok(instruction)
}

pub struct PromptClient {
    api_url: String,
    client: Client,
}

impl PromptClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            api_url: format!("{}/api/prompt", config.api_endpoint.trim_end_matches('/')),
            client: Client::new(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Submit an instruction and return the answer text
    pub async fn ask(&self, instruction: &str) -> Result<String, PromptError> {
        let instruction = validate_instruction(instruction)?;

        let response = self
            .client
            .post(&self.api_url)
            .json(&UserPrompt {
                instruction: instruction.to_string(),
            })
            .send()
            .await
            .map_err(|e| PromptError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PromptError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let answer: Answer = response
            .json()
            .await
            .map_err(|e| PromptError::Transport(e.to_string()))?;
        debug!(chars = answer.text.len(), "Answer received");
        Ok(answer.text)
    }
}
