//! Error types for `cachette-stego`.

use thiserror::Error;

/// Errors produced by the steganography codec.
#[derive(Debug, Error)]
pub enum StegoError {
    /// The cover raster cannot hold the embedded payload.
    #[error("image too small: {0}")]
    ImageTooSmall(String),

    /// Raster dimensions and pixel buffer disagree.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The raster holds no extractable payload (truncated bits, bad
    /// length prefix, or zlib failure).
    #[error("data extraction failed: {0}")]
    DataExtractionFailed(String),

    /// zlib compression failed while building the embedded payload.
    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// The payload needs more carrier images than were provided.
    #[error("data too large: {0}")]
    DataTooLarge(String),
}
