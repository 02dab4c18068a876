// src/mediacloud/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure taxonomy of the remote search service.
///
/// Only [`ApiError::RateLimited`] is retryable; the client retries it with
/// backoff before surfacing it. Everything else aborts the run immediately.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited by the search service (HTTP 429): {message}")]
    RateLimited { message: String },

    #[error("search API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
