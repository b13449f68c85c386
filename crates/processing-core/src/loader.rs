//! Raster loading: resolve a [`RasterSource`] to encoded bytes.
//!
//! Network transport is not part of the engine. [`LocalLoader`] serves
//! in-memory and filesystem sources; embedders that need remote URLs inject
//! their own [`RasterLoader`] (or pre-resolve URLs into a [`MemoryLoader`]).

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use shadowcaster_catalog_model::RasterSource;
use shadowcaster_common::error::{ShadowcasterError, ShadowcasterResult};

/// Resolves raster sources to their encoded bytes.
#[async_trait]
pub trait RasterLoader: Send + Sync {
    /// Fetch the encoded bytes behind `source`.
    async fn load(&self, source: &RasterSource) -> ShadowcasterResult<Arc<[u8]>>;

    /// Loader name, for logs.
    fn name(&self) -> &str;
}

/// Loader for memory blobs and local files. URLs are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLoader;

#[async_trait]
impl RasterLoader for LocalLoader {
    async fn load(&self, source: &RasterSource) -> ShadowcasterResult<Arc<[u8]>> {
        match source {
            RasterSource::Memory { bytes, .. } => Ok(bytes.clone()),
            RasterSource::File { path } => match tokio::fs::read(path).await {
                Ok(bytes) => Ok(Arc::from(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(ShadowcasterError::FileNotFound { path: path.clone() })
                }
                Err(e) => Err(e.into()),
            },
            RasterSource::Url { url } => Err(ShadowcasterError::loader(format!(
                "no network loader configured for {url}"
            ))),
        }
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Loader with a table of pre-resolved URLs, falling back to [`LocalLoader`].
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    urls: HashMap<String, Arc<[u8]>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bytes a URL resolves to.
    pub fn insert(&mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.urls.insert(url.into(), Arc::from(bytes.into()));
    }

    pub fn with(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }
}

#[async_trait]
impl RasterLoader for MemoryLoader {
    async fn load(&self, source: &RasterSource) -> ShadowcasterResult<Arc<[u8]>> {
        match source {
            RasterSource::Url { url } => self
                .urls
                .get(url)
                .cloned()
                .ok_or_else(|| ShadowcasterError::loader(format!("unknown url {url}"))),
            other => LocalLoader.load(other).await,
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Identify an image format from its magic bytes, as a MIME type.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Read width and height from the image header without decoding pixels.
pub fn probe_dimensions(bytes: &[u8]) -> ShadowcasterResult<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Run [`probe_dimensions`] on the blocking pool.
pub async fn probe_dimensions_async(bytes: Arc<[u8]>) -> ShadowcasterResult<(u32, u32)> {
    tokio::task::spawn_blocking(move || probe_dimensions(&bytes))
        .await
        .map_err(|e| ShadowcasterError::Other(anyhow::anyhow!("probe task failed: {e}")))?
}
