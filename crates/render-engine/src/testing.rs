//! Loaders and fixtures for unit tests.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use shadowcaster_catalog_model::RasterSource;
use shadowcaster_common::error::ShadowcasterResult;
use shadowcaster_processing_core::loader::{MemoryLoader, RasterLoader};
use tokio::sync::Notify;

pub fn solid_png(size: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(size, size, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn url(u: &str) -> RasterSource {
    RasterSource::Url { url: u.to_string() }
}

/// Holds loads of one URL until released; reports every other load once served.
pub struct GatedLoader {
    gated_url: String,
    pub entered: Notify,
    pub release: Notify,
    pub served: Notify,
    inner: MemoryLoader,
}

impl GatedLoader {
    /// `mem://{red,green,blue}` solid squares of `size` plus `mem://broken`.
    pub fn new(gated_url: &str, size: u32) -> Arc<Self> {
        Arc::new(Self {
            gated_url: gated_url.to_string(),
            entered: Notify::new(),
            release: Notify::new(),
            served: Notify::new(),
            inner: MemoryLoader::new()
                .with("mem://red", solid_png(size, [255, 0, 0, 255]))
                .with("mem://green", solid_png(size, [0, 255, 0, 255]))
                .with("mem://blue", solid_png(size, [0, 0, 255, 255]))
                .with("mem://broken", b"broken".to_vec()),
        })
    }
}

#[async_trait]
impl RasterLoader for GatedLoader {
    async fn load(&self, source: &RasterSource) -> ShadowcasterResult<Arc<[u8]>> {
        let gated = matches!(source, RasterSource::Url { url } if *url == self.gated_url);
        if gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        let bytes = self.inner.load(source).await;
        if !gated {
            self.served.notify_one();
        }
        bytes
    }

    fn name(&self) -> &str {
        "gated"
    }
}
