//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during compositing and encoding.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource loading or decoding failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// The canvas has no drawable area.
    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),

    /// SVG parsing or rasterization failed.
    #[error("Composite failed: {0}")]
    Composite(String),

    /// Encoding to an output format failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Reading an asset from disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
