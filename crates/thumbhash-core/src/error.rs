//! Error types for ThumbHash placeholder generation.
//!
//! Errors are organized by stage so that a failure can be traced back to the
//! file and the step that produced it (sampling, pixel extraction, hashing,
//! rendering).

use thiserror::Error;

/// Top-level error type for ThumbHash operations.
#[derive(Error, Debug)]
pub enum ThumbHashError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Placeholder pipeline errors
    #[error("Placeholder error: {0}")]
    Placeholder(#[from] PlaceholderError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Placeholder pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PlaceholderError {
    /// Image bytes could not be parsed by the active backend
    #[error("Unable to read image data: {message}")]
    Decode { message: String },

    /// The configured pixel extraction backend is not compiled in
    #[error("{engine} driver is not available")]
    DriverUnavailable { engine: String },

    /// The sample thumbnail came back with unexpected dimensions
    #[error(
        "Failed to generate thumbhash for {file}: image could not be resized to \
         expected sample dimensions ({expected_width}x{expected_height}, got \
         {actual_width}x{actual_height}), will retry"
    )]
    ResizeMismatch {
        file: String,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Pixel extraction failed for a file
    #[error("Failed to extract pixels from {file} using {engine} driver: {message}")]
    ExtractionFailed {
        file: String,
        engine: String,
        message: String,
    },

    /// Hash bytes violate the ThumbHash layout
    #[error("Malformed thumbhash: {message}")]
    MalformedHash { message: String },

    /// Raster dimensions or buffer length are unusable
    #[error("Invalid raster: {message}")]
    InvalidRaster { message: String },

    /// Aspect ratio is not a positive finite number
    #[error("Invalid aspect ratio for {file}: {ratio}")]
    InvalidRatio { file: String, ratio: f64 },

    /// The file collaborator failed to produce or read a thumbnail
    #[error("Thumbnail error for {file}: {message}")]
    Thumbnail { file: String, message: String },

    /// Encoding the placeholder image failed
    #[error("Render error: {message}")]
    Render { message: String },
}

impl PlaceholderError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedHash {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_raster(message: impl Into<String>) -> Self {
        Self::InvalidRaster {
            message: message.into(),
        }
    }
}

/// Convenience type alias for ThumbHash results.
pub type Result<T> = std::result::Result<T, ThumbHashError>;

/// Convenience type alias for pipeline-specific results.
pub type PlaceholderResult<T> = std::result::Result<T, PlaceholderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_mismatch_names_file() {
        let err = PlaceholderError::ResizeMismatch {
            file: "cover.jpg".to_string(),
            expected_width: 100,
            expected_height: 50,
            actual_width: 80,
            actual_height: 50,
        };
        let msg = err.to_string();
        assert!(msg.contains("cover.jpg"));
        assert!(msg.contains("100x50"));
        assert!(msg.contains("80x50"));
    }

    #[test]
    fn test_extraction_failed_carries_cause() {
        let err = PlaceholderError::ExtractionFailed {
            file: "a.png".to_string(),
            engine: "basic".to_string(),
            message: "Unable to read image data".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to extract pixels from a.png using basic driver: Unable to read image data"
        );
    }

    #[test]
    fn test_placeholder_error_converts_to_top_level() {
        let err: ThumbHashError = PlaceholderError::malformed("too short").into();
        assert!(matches!(
            err,
            ThumbHashError::Placeholder(PlaceholderError::MalformedHash { .. })
        ));
    }
}
