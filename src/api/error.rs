// Copyright (c) 2025 - Cowboy AI, Inc.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::inference::InferenceError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Upstream(#[from] InferenceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        };

        (status, self.to_string()).into_response()
    }
}
