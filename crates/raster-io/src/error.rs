//! Error types for raster access.

use thiserror::Error;

/// Errors that can occur while opening, reading or translating rasters.
#[derive(Error, Debug)]
pub enum RasterError {
    /// Failed to open the raster.
    #[error("failed to open raster: {0}")]
    OpenFailed(String),

    /// A sidecar or header value could not be parsed.
    #[error("invalid raster metadata: {0}")]
    InvalidMetadata(String),

    /// Band index outside `1..=band_count`.
    #[error("band {index} out of range (dataset has {count} band(s))")]
    BandOutOfRange { index: usize, count: usize },

    /// Failed to read sample data.
    #[error("failed to read raster data: {0}")]
    ReadFailed(String),

    /// Destination buffer does not match the raster.
    #[error("buffer mismatch: {0}")]
    BufferMismatch(String),

    /// Translate arguments could not be parsed.
    #[error("invalid translate options: {0}")]
    InvalidOptions(String),

    /// Translation failed.
    #[error("translate failed: {0}")]
    TranslateFailed(String),

    /// Pixel layout the backend cannot express.
    #[error("unsupported raster layout: {0}")]
    Unsupported(String),
}

impl RasterError {
    /// Create an OpenFailed error.
    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create an InvalidOptions error.
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }
}

impl From<std::io::Error> for RasterError {
    fn from(err: std::io::Error) -> Self {
        Self::OpenFailed(err.to_string())
    }
}

impl From<image::ImageError> for RasterError {
    fn from(err: image::ImageError) -> Self {
        Self::OpenFailed(err.to_string())
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;
