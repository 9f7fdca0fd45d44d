//! Error types for rastyle.

use rastyle_canvas::GraphicsError;
use thiserror::Error;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that abort a render or composite call.
///
/// Every variant is fatal to the current call; partially built buffers are
/// dropped and no image is produced.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A canvas or sample buffer could not be allocated.
    #[error("Failed to allocate {0}")]
    AllocationFailure(String),

    /// The graphics backend reported an internal failure.
    #[error("Graphics backend error: {0}")]
    BackendStatus(String),

    /// The symbolizer/coverage combination has no output pixel kind.
    #[error("Unsupported pixel kind: {0}")]
    UnsupportedPixelKind(String),

    /// Requested canvas aspect ratio differs from the native one and
    /// re-aspecting is not allowed.
    #[error("Aspect ratio mismatch: requested {requested:.4}, native {native:.4}")]
    AspectMismatch { requested: f64, native: f64 },

    /// The storage collaborator returned an error.
    #[error("Storage query failed: {0}")]
    StorageQueryFailure(String),

    /// The requested canvas or extent cannot be rendered.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Output encoding failed.
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// Configuration could not be read or parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Graphics(#[from] GraphicsError),
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Encoder(err.to_string())
    }
}

impl From<png::EncodingError> for RenderError {
    fn from(err: png::EncodingError) -> Self {
        RenderError::Encoder(err.to_string())
    }
}
