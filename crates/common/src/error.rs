//! Error types shared across Shadowcaster crates.

use std::path::PathBuf;

/// Top-level error type for Shadowcaster operations.
#[derive(Debug, thiserror::Error)]
pub enum ShadowcasterError {
    #[error("Unsupported media: {mime} is not an image")]
    UnsupportedMedia { mime: String },

    #[error("Aspect ratio rejected: {width}x{height} is not square")]
    AspectRatioRejected { width: u32, height: u32 },

    #[error("Base image decode failed: {message}")]
    BaseDecodeFailed { message: String },

    #[error("Overlay decode failed: {message}")]
    OverlayDecodeFailed { message: String },

    #[error("Loader error: {message}")]
    Loader { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Catalog error: {message}")]
    Catalog { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ShadowcasterError.
pub type ShadowcasterResult<T> = Result<T, ShadowcasterError>;

impl ShadowcasterError {
    pub fn unsupported_media(mime: impl Into<String>) -> Self {
        Self::UnsupportedMedia { mime: mime.into() }
    }

    pub fn aspect_ratio(width: u32, height: u32) -> Self {
        Self::AspectRatioRejected { width, height }
    }

    pub fn base_decode(msg: impl Into<String>) -> Self {
        Self::BaseDecodeFailed {
            message: msg.into(),
        }
    }

    pub fn overlay_decode(msg: impl Into<String>) -> Self {
        Self::OverlayDecodeFailed {
            message: msg.into(),
        }
    }

    pub fn loader(msg: impl Into<String>) -> Self {
        Self::Loader {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the error should be shown to the end user as a message
    /// asking for a different file, rather than reported as a fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMedia { .. }
                | Self::AspectRatioRejected { .. }
                | Self::BaseDecodeFailed { .. }
        )
    }
}
