//! Error types for the mirador diff-block library.

use thiserror::Error;

/// Primary error type for diff-block construction and validation.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("malformed bbox key on page {page}: {msg}")]
    MalformedKey { page: u32, msg: String },

    #[error("page image unavailable: {0}")]
    ImageUnavailable(String),

    #[error("degenerate crop: {width}x{height} at ({x}, {y})")]
    CropDegenerate {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("secondary recognition failed: {0}")]
    RecognitionFailed(String),

    #[error("secondary recognition service unavailable")]
    ServiceUnavailable,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias for DiffError.
pub type Result<T> = std::result::Result<T, DiffError>;
