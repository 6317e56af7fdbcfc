// Copyright (c) 2025 - Cowboy AI, Inc.
//! Prompt client
//!
//! Sends one instruction to the prompt API and prints the answer.
//!
//! Run with: cargo run --bin genai-prompt -- "<instruction>"

use anyhow::Result;
use genai_infra::api::{PromptClient, PromptError};
use genai_infra::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let instruction = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let client = PromptClient::new(&ClientConfig::from_env());

    match client.ask(&instruction).await {
        Ok(text) => println!("{text}"),
        Err(PromptError::EmptyInstruction) => {
            eprintln!("{}", PromptError::EmptyInstruction);
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
