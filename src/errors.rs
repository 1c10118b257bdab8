//! Crate-level error taxonomy
//!
//! Every failure of the ingest and composite pipeline ends up as one
//! `OverlayError`, which callers can render as a structured JSON response.

use serde::Serialize;
use std::fmt;
use std::io;

use crate::tiff::errors::TiffError;

/// Errors surfaced by the raster overlay pipeline
#[derive(Debug)]
pub enum OverlayError {
    /// The raster or an output artifact could not be read or written
    Io {
        context: String,
        source: io::Error,
    },
    /// The raster lacks bands, georeferencing or a supported layout
    MalformedRaster(String),
    /// Pixel data could not be turned into display values
    Normalization(String),
    /// Configuration could not be loaded or is invalid
    Config(String),
}

impl OverlayError {
    /// Wraps an I/O error with a description of what was being done
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        OverlayError::Io { context: context.into(), source }
    }

    /// Stable machine-readable error category
    pub fn kind(&self) -> &'static str {
        match self {
            OverlayError::Io { .. } => "io",
            OverlayError::MalformedRaster(_) => "malformed_raster",
            OverlayError::Normalization(_) => "normalization",
            OverlayError::Config(_) => "config",
        }
    }

    /// The structured response for this error
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
        }
    }
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::Io { context, source } => write!(f, "I/O error while {}: {}", context, source),
            OverlayError::MalformedRaster(msg) => write!(f, "Malformed raster: {}", msg),
            OverlayError::Normalization(msg) => write!(f, "Normalization failed: {}", msg),
            OverlayError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OverlayError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TiffError> for OverlayError {
    fn from(error: TiffError) -> Self {
        match error {
            TiffError::IoError(e) => OverlayError::io("reading raster", e),
            other => OverlayError::MalformedRaster(other.to_string()),
        }
    }
}

impl From<image::ImageError> for OverlayError {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::IoError(e) => OverlayError::io("encoding image", e),
            other => OverlayError::io("encoding image", io::Error::new(io::ErrorKind::Other, other)),
        }
    }
}

impl From<toml::de::Error> for OverlayError {
    fn from(error: toml::de::Error) -> Self {
        OverlayError::Config(error.to_string())
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(error: serde_json::Error) -> Self {
        OverlayError::io("serializing JSON", io::Error::new(io::ErrorKind::Other, error))
    }
}

/// Result type for pipeline operations
pub type OverlayResult<T> = Result<T, OverlayError>;

/// JSON error body: `{"error": "...", "kind": "..."}`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiff_io_errors_stay_io() {
        let err: OverlayError = TiffError::IoError(io::Error::new(io::ErrorKind::UnexpectedEof, "eof")).into();
        assert_eq!(err.kind(), "io");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn other_tiff_errors_become_malformed() {
        let err: OverlayError = TiffError::UnsupportedCompression(7).into();
        assert_eq!(err.kind(), "malformed_raster");
        assert!(err.to_string().contains("Unsupported compression method: 7"));
    }

    #[test]
    fn response_serializes_error_and_kind() {
        let response = OverlayError::Config("opacity out of range".to_string()).to_response();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["kind"], "config");
        assert_eq!(json["error"], "Invalid configuration: opacity out of range");
    }
}
