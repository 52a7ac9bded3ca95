//! Error types shared across the crate
//!
//! Component-specific errors live next to their component
//! (`rate::RateLimitError`, `retry::RetryError`). This module holds the
//! cancellation class they share, configuration loading failures, and the
//! HTTP-boundary mapping used by the demo server.

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::rate::RateLimitError;
use crate::retry::RetryError;

// == Interrupted ==
/// The caller's cancellation handle ended before the work could finish.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    /// Explicitly cancelled through its token.
    #[error("operation cancelled")]
    Cancelled,

    /// The attached deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

// == Config Error ==
/// Failure to load a configuration document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

// == Api Error ==
/// Errors surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected by the rate limiter
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Gave up after exhausting retries
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// Caller went away or ran out of time
    #[error("Request interrupted: {0}")]
    Interrupted(#[from] Interrupted),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl<E: Display> From<RetryError<E>> for ApiError {
    fn from(err: RetryError<E>) -> Self {
        match err {
            RetryError::Interrupted(reason) => ApiError::Interrupted(reason),
            RetryError::Exhausted { .. } => ApiError::Unavailable(err.to_string()),
            RetryError::Aborted(source) => ApiError::Internal(source.to_string()),
        }
    }
}

impl<E: Into<ApiError>> From<RateLimitError<E>> for ApiError {
    fn from(err: RateLimitError<E>) -> Self {
        match err {
            RateLimitError::Exceeded => ApiError::RateLimited,
            RateLimitError::Interrupted(reason) => ApiError::Interrupted(reason),
            RateLimitError::Operation(source) => source.into(),
        }
    }
}

impl From<std::convert::Infallible> for ApiError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

// == IntoResponse Implementation ==
impl ApiError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Interrupted(Interrupted::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Interrupted(Interrupted::DeadlineExceeded) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
