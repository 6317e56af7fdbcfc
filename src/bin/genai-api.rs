// Copyright (c) 2025 - Cowboy AI, Inc.
//! Prompt API server
//!
//! Serves `GET /api/health` and `POST /api/prompt` on `GENAI_BIND_ADDR`
//! (default `0.0.0.0:8080`), forwarding prompts to the hosted model.
//!
//! Run with: cargo run --bin genai-api

use anyhow::{Context, Result};
use genai_infra::api::{self, HttpInferenceClient};
use genai_infra::ServerConfig;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::from_env().context("Failed to load server configuration")?;
    info!(
        model = %config.inference.model_id,
        region = %config.inference.region,
        "Starting prompt API"
    );

    let inference = HttpInferenceClient::new(config.inference.clone())
        .context("Failed to create inference client")?;

    api::serve(&config, Arc::new(inference))
        .await
        .context("Server error")?;

    Ok(())
}
