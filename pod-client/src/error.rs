//! Request pipeline error types.

use pod_core::{AppError, GENERIC_USER_MESSAGE};
use thiserror::Error;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur when talking to the print service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP layer failed (connection, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success code, or another
    /// categorized failure occurred.
    #[error(transparent)]
    App(#[from] AppError),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The target URL is invalid.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name or value is invalid.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ApiError {
    /// The service code, if the service answered with a failure.
    #[must_use]
    pub fn service_code(&self) -> Option<i32> {
        match self {
            Self::App(e) => e.service_code(),
            _ => None,
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::App(e) => e.user_message(),
            other if cfg!(debug_assertions) => other.to_string(),
            _ => GENERIC_USER_MESSAGE.to_string(),
        }
    }
}
