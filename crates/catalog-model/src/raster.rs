//! Raster source references.
//!
//! A [`RasterSource`] points at encoded pixel data without decoding it.
//! Sources are immutable once built and cheap to clone: in-memory blobs
//! share their bytes through an `Arc`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opaque reference to encoded pixel data.
#[derive(Clone, PartialEq, Eq)]
pub enum RasterSource {
    /// An in-memory file blob, typically a user upload.
    Memory {
        bytes: Arc<[u8]>,
        /// Content type declared by whoever produced the blob.
        mime: Option<String>,
    },
    /// A file on the local filesystem.
    File { path: PathBuf },
    /// A remote URL; resolving it is left to an injected loader.
    Url { url: String },
}

impl RasterSource {
    /// Wrap an uploaded blob together with its declared content type.
    pub fn from_upload(bytes: impl Into<Vec<u8>>, mime: impl Into<String>) -> Self {
        Self::Memory {
            bytes: Arc::from(bytes.into()),
            mime: Some(mime.into()),
        }
    }

    /// Wrap encoded bytes whose content type is unknown.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Memory {
            bytes: Arc::from(bytes.into()),
            mime: None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Interpret a catalog `image_url` string.
    ///
    /// `http(s)://` references become [`RasterSource::Url`]; `file://`
    /// references and bare paths become [`RasterSource::File`].
    pub fn from_reference(reference: &str) -> Self {
        let trimmed = reference.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url {
                url: trimmed.to_string(),
            }
        } else if let Some(path) = trimmed.strip_prefix("file://") {
            Self::from_path(path)
        } else {
            Self::from_path(trimmed)
        }
    }

    /// The content type this source claims to carry, if any.
    ///
    /// Memory blobs report what the uploader declared. Files and URLs are
    /// classified by extension when it names a known image format.
    pub fn declared_mime(&self) -> Option<String> {
        match self {
            Self::Memory { mime, .. } => mime.clone(),
            Self::File { path } => mime_from_extension(path),
            Self::Url { url } => {
                let without_query = url.split(&['?', '#'][..]).next().unwrap_or(url.as_str());
                mime_from_extension(Path::new(without_query))
            }
        }
    }

    /// Short human-readable label for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Memory { bytes, .. } => format!("memory:{}B", bytes.len()),
            Self::File { path } => format!("file:{}", path.display()),
            Self::Url { url } => format!("url:{url}"),
        }
    }
}

impl fmt::Debug for RasterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory { bytes, mime } => f
                .debug_struct("Memory")
                .field("len", &bytes.len())
                .field("mime", mime)
                .finish(),
            Self::File { path } => f.debug_struct("File").field("path", path).finish(),
            Self::Url { url } => f.debug_struct("Url").field("url", url).finish(),
        }
    }
}

fn mime_from_extension(path: &Path) -> Option<String> {
    image::ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}
