//! Domain error types
//!
//! This module defines the error hierarchy for Floodline. Errors are
//! domain-specific and don't expose third-party types; library errors are
//! converted at the boundary.
//!
//! A clip or overlay that produces no geometry is a valid outcome, not an
//! error. It surfaces as [`crate::core::pipeline::SkipReason::EmptyGeometry`].

use thiserror::Error;

/// Main Floodline error type
#[derive(Debug, Error)]
pub enum FloodlineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A required boundary, raster, population or coverage file is missing
    #[error("Data not found: {0}")]
    DataNotFound(String),

    /// Raster could not be decoded or has an unsupported layout
    #[error("Malformed raster: {0}")]
    MalformedRaster(String),

    /// Degenerate overlay inputs
    #[error("Overlay error: {0}")]
    Overlay(String),

    /// Input dataset is readable but its contents are invalid
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl FloodlineError {
    /// Whether the pipeline should record this as a skip rather than a failure
    ///
    /// Missing inputs are expected in a batch over many countries and hazard
    /// files; everything else indicates a problem worth surfacing.
    pub fn is_skippable(&self) -> bool {
        matches!(self, FloodlineError::DataNotFound(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FloodlineError {
    fn from(err: std::io::Error) -> Self {
        FloodlineError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FloodlineError {
    fn from(err: serde_json::Error) -> Self {
        FloodlineError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FloodlineError {
    fn from(err: toml::de::Error) -> Self {
        FloodlineError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Any TIFF failure other than plain I/O means the raster itself is unusable
impl From<tiff::TiffError> for FloodlineError {
    fn from(err: tiff::TiffError) -> Self {
        match err {
            tiff::TiffError::IoError(e) => FloodlineError::Io(e.to_string()),
            other => FloodlineError::MalformedRaster(other.to_string()),
        }
    }
}

impl From<csv::Error> for FloodlineError {
    fn from(err: csv::Error) -> Self {
        FloodlineError::InvalidData(format!("CSV error: {err}"))
    }
}

impl From<geojson::Error> for FloodlineError {
    fn from(err: geojson::Error) -> Self {
        FloodlineError::InvalidData(format!("GeoJSON error: {err}"))
    }
}
