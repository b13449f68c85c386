//! Asynchronous raster decoding.

use std::sync::Arc;

use image::RgbaImage;
use shadowcaster_catalog_model::RasterSource;
use shadowcaster_common::error::{ShadowcasterError, ShadowcasterResult};
use shadowcaster_processing_core::loader::RasterLoader;

/// Load and fully decode a raster source to straight-alpha RGBA8.
///
/// Pixel decoding runs on the blocking pool so the caller's task only
/// waits on the completion.
pub async fn decode_raster(
    loader: Arc<dyn RasterLoader>,
    source: RasterSource,
) -> ShadowcasterResult<RgbaImage> {
    let bytes = loader.load(&source).await?;
    let decoded = tokio::task::spawn_blocking(move || decode_bytes(&bytes))
        .await
        .map_err(|e| ShadowcasterError::Other(anyhow::anyhow!("decode task failed: {e}")))??;
    tracing::trace!(
        source = %source.describe(),
        width = decoded.width(),
        height = decoded.height(),
        "Decoded raster"
    );
    Ok(decoded)
}

/// Decode encoded bytes to straight-alpha RGBA8.
pub fn decode_bytes(bytes: &[u8]) -> ShadowcasterResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)?;
    Ok(dyn_img.to_rgba8())
}
