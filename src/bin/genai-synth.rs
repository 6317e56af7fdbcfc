// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment plan synthesizer
//!
//! Builds the GenAI demo topology from `GENAI_*` environment variables and
//! emits the deployment plan as JSON.
//!
//! Run with: cargo run --bin genai-synth -- [output.json]
//!
//! Without an output path the plan is written to stdout.

use anyhow::{Context, Result};
use genai_infra::{DeploymentConfig, GenAiDemo};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = DeploymentConfig::from_env().context("Failed to load deployment configuration")?;
    info!(
        project = %config.project,
        services = config.services.len(),
        "Synthesizing deployment plan"
    );

    let plan = GenAiDemo::synthesize(&config).context("Synthesis failed")?;
    let json = plan.to_json().context("Failed to serialize deployment plan")?;

    match std::env::args().nth(1) {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("Failed to write {path}"))?;
            info!(path = %path, nodes = plan.nodes.len(), "Deployment plan written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
