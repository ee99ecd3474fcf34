//! Error types for report composition and image acquisition

use std::time::Duration;
use thiserror::Error;

/// Result type alias using ComposeError
pub type Result<T> = std::result::Result<T, ComposeError>;

/// Errors that abort composition before any page is produced
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Error from the underlying lopdf library
    #[cfg(feature = "pdf")]
    #[error("PDF operation failed: {0}")]
    PdfError(#[from] lopdf::Error),

    /// A block violates the content model contract
    #[error("Invalid block {index}: {reason}")]
    InvalidBlock { index: usize, reason: String },

    /// Invalid page or font dimensions
    #[error("Invalid dimensions: {0}")]
    DimensionError(String),

    /// Invalid layout configuration
    #[error("Invalid layout configuration: {0}")]
    ConfigError(String),

    /// Writing rendered output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ComposeError {
    pub(crate) fn invalid_block(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidBlock {
            index,
            reason: reason.into(),
        }
    }
}

/// Errors raised while acquiring an image.
///
/// These never abort composition; the composer substitutes a placeholder.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Refusing to load '{0}' outside the image directory")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image could not be decoded: {0}")]
    Decode(String),

    #[error("Image acquisition did not complete within {0:?}")]
    TimedOut(Duration),
}

impl From<image::ImageError> for AcquireError {
    fn from(err: image::ImageError) -> Self {
        AcquireError::Decode(err.to_string())
    }
}
