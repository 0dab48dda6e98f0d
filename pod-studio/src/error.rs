//! Studio error types.

use pod_client::ApiError;
use pod_core::{AppError, CanvasError, StoreError, GENERIC_USER_MESSAGE};
use pod_renderer::RenderError;
use thiserror::Error;

/// Result type for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors surfaced by the studio.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Capturing or encoding the canvas failed.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// A request to the print service failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A categorized application failure.
    #[error(transparent)]
    App(#[from] AppError),

    /// An edit addressed a missing item or the wrong kind of item.
    #[error("Canvas error: {0}")]
    Canvas(#[from] CanvasError),

    /// Reading or writing local state failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An edit script is malformed.
    #[error("Script error: {0}")]
    Script(String),

    /// Filesystem failure outside the stores.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON failure outside the stores.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StudioError {
    /// Message suitable for an alert.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::App(e) => e.user_message(),
            other if cfg!(debug_assertions) => other.to_string(),
            _ => GENERIC_USER_MESSAGE.to_string(),
        }
    }

    /// Log this error with as much structure as it carries.
    pub fn trace_warn(&self, context: &str) {
        match self {
            Self::App(e) | Self::Api(ApiError::App(e)) => e.trace_warn(context),
            other => tracing::warn!(error = %other, "{context}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_core::location;

    #[test]
    fn test_service_error_message_passes_through() {
        let error: StudioError =
            ApiError::from(AppError::service(500, "boom", location!())).into();
        assert!(error.user_message().contains("[500]: boom"));
    }

    #[test]
    fn test_script_error_display() {
        let error = StudioError::Script("no item 3".to_string());
        assert_eq!(error.to_string(), "Script error: no item 3");
    }
}
