// Copyright (c) 2025 - Cowboy AI, Inc.
//! Prompt API Tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot` against
//! an in-memory inference backend.

#![cfg(feature = "server")]

mod fixtures;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use genai_infra::api::{router, AppState, PromptClient, PromptError};
use genai_infra::ClientConfig;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use fixtures::inference::CannedInference;

fn prompt_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/prompt")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = router(AppState::new(Arc::new(CannedInference::replying(""))));

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body, json!({ "status": "OK" }));
}

#[tokio::test]
async fn test_prompt_returns_model_text() {
    let inference = Arc::new(CannedInference::replying("서울은 맑습니다."));
    let app = router(AppState::new(inference.clone()));

    let response = app
        .oneshot(prompt_request(r#"{"instruction": "서울 날씨 어때?"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body, json!({ "text": "서울은 맑습니다." }));
    assert_eq!(inference.seen(), ["서울 날씨 어때?"]);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let app = router(AppState::new(Arc::new(CannedInference::failing(
        429,
        "Too many requests",
    ))));

    let response = app
        .oneshot(prompt_request(r#"{"instruction": "hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("Too many requests"), "{body}");
}

#[tokio::test]
async fn test_malformed_prompt_rejected_before_inference() {
    let inference = Arc::new(CannedInference::replying("unused"));
    let app = router(AppState::new(inference.clone()));

    let response = app
        .oneshot(prompt_request(r#"{"question": "hi"}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert!(inference.seen().is_empty());
}

#[tokio::test]
async fn test_unknown_route_not_found() {
    let app = router(AppState::new(Arc::new(CannedInference::replying(""))));

    let response = app
        .oneshot(Request::get("/api/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_blocks_empty_instruction() {
    let client = PromptClient::new(&ClientConfig::from_lookup(fixtures::vars(&[(
        "API_ENDPOINT",
        "http://127.0.0.1:9",
    )])));

    let err = client.ask("").await.unwrap_err();
    assert_eq!(err, PromptError::EmptyInstruction);
    assert_eq!(err.to_string(), "질문을 입력하세요.");
}
