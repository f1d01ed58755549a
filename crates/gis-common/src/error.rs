//! Error types for terrain GIS ingest.

use thiserror::Error;

use crate::data::DatasetRole;

/// Result type alias using GisError.
pub type GisResult<T> = Result<T, GisError>;

/// Broad classification of a [`GisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad request parameters, reported before any side effect.
    InputValidation,
    /// A dataset could not be opened or lacks required metadata.
    SourceOpen,
    /// Two rasters (or a raster and the configured limits) do not agree.
    Compatibility,
    /// Format translation, band read or coordinate transform failed.
    Conversion,
    /// A tile fetch failed at the transport level.
    Transport,
    /// A tile payload could not be decoded.
    Decode,
    /// A computed buffer offset was out of range.
    InternalBounds,
    /// Anything else that indicates a broken invariant.
    Internal,
}

/// Primary error type for GIS data retrieval.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GisError {
    // === Input Validation Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Source Errors ===
    #[error("Failed to open the {role} dataset")]
    SourceOpen { role: DatasetRole },

    #[error("Failed to retrieve the {what} of the {role} dataset")]
    MissingMetadata { role: DatasetRole, what: String },

    // === Compatibility Errors ===
    #[error("The heightmap dataset and RGB dataset must use the same projected coordinate system")]
    CrsMismatch,

    #[error(
        "The heightmap dataset and RGB dataset must have the same geographic extents \
         (heightmap {heightmap}, RGB {color})"
    )]
    ExtentMismatch { heightmap: String, color: String },

    #[error("RGB dataset must contain R, G and B channels (found {found} band(s), need {required})")]
    InsufficientBands { found: usize, required: usize },

    #[error(
        "{what} raster size of {width}x{height} exceeds maximum supported size of {max_width}x{max_height}"
    )]
    RasterTooLarge {
        what: String,
        width: u64,
        height: u64,
        max_width: u64,
        max_height: u64,
    },

    // === Conversion Errors ===
    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Failed to read the data from the {role} dataset: {message}")]
    RasterRead { role: DatasetRole, message: String },

    #[error("Unsupported pixel format for colour data: {0}")]
    UnsupportedPixelFormat(String),

    // === Tile Errors ===
    #[error("One or more requests failed: Web request failed ({0})")]
    Transport(String),

    #[error("One or more requests failed: Unable to process image ({0})")]
    Decode(String),

    // === Internal Errors ===
    #[error("Buffer offset out of bounds: {0}")]
    InternalBounds(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GisError {
    /// Shorthand for an [`GisError::InvalidParameter`].
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`GisError::MissingMetadata`].
    pub fn missing_metadata(role: DatasetRole, what: impl Into<String>) -> Self {
        Self::MissingMetadata {
            role,
            what: what.into(),
        }
    }

    /// Get the taxonomy class for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GisError::InvalidParameter { .. } => ErrorKind::InputValidation,

            GisError::SourceOpen { .. } | GisError::MissingMetadata { .. } => ErrorKind::SourceOpen,

            GisError::CrsMismatch
            | GisError::ExtentMismatch { .. }
            | GisError::InsufficientBands { .. }
            | GisError::RasterTooLarge { .. } => ErrorKind::Compatibility,

            GisError::Conversion(_)
            | GisError::RasterRead { .. }
            | GisError::UnsupportedPixelFormat(_) => ErrorKind::Conversion,

            GisError::Transport(_) => ErrorKind::Transport,
            GisError::Decode(_) => ErrorKind::Decode,
            GisError::InternalBounds(_) => ErrorKind::InternalBounds,
            GisError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the error was raised before any I/O was attempted.
    pub fn is_input_error(&self) -> bool {
        self.kind() == ErrorKind::InputValidation
    }
}

impl From<std::io::Error> for GisError {
    fn from(err: std::io::Error) -> Self {
        GisError::Internal(err.to_string())
    }
}
