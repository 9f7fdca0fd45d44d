//! Error types for rastyle-canvas.

use thiserror::Error;

/// Result type alias using GraphicsError.
pub type GraphicsResult<T> = Result<T, GraphicsError>;

/// Errors that can occur in graphics context operations.
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// The drawing surface could not be allocated.
    #[error("Failed to initialize drawing surface: {0}")]
    BackendInit(String),

    /// Invalid surface or buffer dimensions.
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The graphics backend reported an internal failure.
    #[error("Graphics backend error: {0}")]
    BackendStatus(String),

    /// Failed to parse color value.
    #[error("Failed to parse color: {0}")]
    ColorParse(String),

    /// An argument was outside of its accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Pixel extraction was requested from an SVG or PDF context.
    #[error("Operation requires a bitmap surface")]
    NotABitmapSurface,

    /// Writing a surface to its destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    Png(String),

    /// PDF page conversion error.
    #[error("PDF error: {0}")]
    Pdf(String),
}

impl From<png::EncodingError> for GraphicsError {
    fn from(err: png::EncodingError) -> Self {
        GraphicsError::Png(err.to_string())
    }
}
