// Copyright (c) 2025 - Cowboy AI, Inc.
//! Prompt API
//!
//! HTTP surface of the backend service:
//!
//! - `GET  /api/health` → `{"status": "OK"}`
//! - `POST /api/prompt` `{"instruction": "..."}` → `{"text": "..."}`
//!
//! Upstream inference failures surface as `502 Bad Gateway` carrying the
//! upstream message. Malformed bodies are rejected by the JSON extractor.

pub mod client;
pub mod error;
pub mod inference;
pub mod routes;

pub use client::{validate_instruction, PromptClient, PromptError, EMPTY_INSTRUCTION_MESSAGE};
pub use error::ApiError;
pub use inference::{HttpInferenceClient, InferenceClient, InferenceError};
pub use routes::{AppState, Answer, HealthCheck, UserPrompt};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::ServerConfig;
use routes::{health_handler, prompt_handler};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/prompt", post(prompt_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(config: &ServerConfig, inference: Arc<dyn InferenceClient>) -> std::io::Result<()> {
    let app = router(AppState::new(inference));

    info!("Binding to {}", config.bind_addr);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
