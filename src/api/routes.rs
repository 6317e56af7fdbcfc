// Copyright (c) 2025 - Cowboy AI, Inc.
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::error::ApiError;
use super::inference::InferenceClient;

#[derive(Clone)]
pub struct AppState {
    pub inference: Arc<dyn InferenceClient>,
}

impl AppState {
    pub fn new(inference: Arc<dyn InferenceClient>) -> Self {
        Self { inference }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPrompt {
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
}

pub async fn health_handler() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "OK".to_string(),
    })
}

pub async fn prompt_handler(
    State(state): State<AppState>,
    Json(prompt): Json<UserPrompt>,
) -> Result<Json<Answer>, ApiError> {
    debug!(chars = prompt.instruction.len(), "Prompt received");
    let text = state.inference.converse(&prompt.instruction).await?;
    Ok(Json(Answer { text }))
}
