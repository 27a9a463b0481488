//! Error types shared across Shortsmith crates.

use std::path::PathBuf;

/// Top-level error type for Shortsmith operations.
#[derive(Debug, thiserror::Error)]
pub enum ShortsmithError {
    /// The face detector is not compiled in, or its model cannot be loaded.
    #[error("Face detector unavailable: {message}")]
    DetectorUnavailable { message: String },

    #[error("Frame extraction failed: {message}")]
    FrameExtraction { message: String },

    #[error("Face detection failed: {message}")]
    Detection { message: String },

    #[error("Probe error: {message}")]
    Probe { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Invalid geometry: {message}")]
    Geometry { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ShortsmithError.
pub type ShortsmithResult<T> = Result<T, ShortsmithError>;

impl ShortsmithError {
    pub fn detector_unavailable(msg: impl Into<String>) -> Self {
        Self::DetectorUnavailable {
            message: msg.into(),
        }
    }

    pub fn frame_extraction(msg: impl Into<String>) -> Self {
        Self::FrameExtraction {
            message: msg.into(),
        }
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error means the pipeline cannot run at all in the
    /// current environment, as opposed to a failure tied to one input.
    pub fn is_fatal_configuration(&self) -> bool {
        matches!(self, Self::DetectorUnavailable { .. } | Self::Config { .. })
    }
}
