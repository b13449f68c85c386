//! Compositor: layers a base portrait and an optional overlay.
//!
//! Each render owns a fresh [`Canvas`]. The state machine per call is:
//!
//! 1. **Init**: allocate a transparent square canvas.
//! 2. **DrawBase**: decode the base, stretch it to the canvas, draw opaque.
//! 3. **DrawOverlay**: if requested, decode the overlay and draw it at the
//!    configured opacity. A failed overlay leaves the base-only composite.
//! 4. **Ready**: the canvas holds the final composite.
//!
//! The overlay decode is started together with the base decode, but its
//! pixels are only drawn once the base has been committed, whichever
//! decode finishes first.

use std::io::Cursor;
use std::sync::Arc;

use image::RgbaImage;
use shadowcaster_catalog_model::CompositeRequest;
use shadowcaster_common::config::CompositorConfig;
use shadowcaster_common::error::{ShadowcasterError, ShadowcasterResult};
use shadowcaster_processing_core::loader::{LocalLoader, RasterLoader};
use tokio::task::JoinHandle;

use crate::canvas::Canvas;
use crate::decode::decode_raster;

/// Renders composite requests into owned square buffers.
#[derive(Clone)]
pub struct CompositeRenderer {
    config: CompositorConfig,
    loader: Arc<dyn RasterLoader>,
}

impl CompositeRenderer {
    pub fn new(config: CompositorConfig, loader: Arc<dyn RasterLoader>) -> Self {
        Self { config, loader }
    }

    /// 400x400 canvas, 0.5 overlay opacity, local sources only.
    pub fn with_defaults() -> Self {
        Self::new(CompositorConfig::default(), Arc::new(LocalLoader))
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn canvas_size(&self) -> u32 {
        self.config.canvas_size
    }

    /// Render a request to completion.
    ///
    /// Fails only if the base cannot be loaded or decoded; overlay problems
    /// degrade to a base-only composite.
    pub async fn render(&self, request: CompositeRequest) -> ShadowcasterResult<CompositeResult> {
        let pending = self.start(request).await?;
        Ok(pending.finish().await)
    }

    /// Run Init and DrawBase, leaving the overlay (if any) in flight.
    pub async fn start(&self, request: CompositeRequest) -> ShadowcasterResult<PendingComposite> {
        let CompositeRequest { base, overlay } = request;
        tracing::info!(
            base = %base.describe(),
            overlay = %overlay.as_ref().map(|o| o.describe()).unwrap_or_default(),
            size = self.config.canvas_size,
            "Starting composite render"
        );

        let overlay = overlay.map(|source| OverlayTask {
            label: source.describe(),
            handle: tokio::spawn(decode_raster(self.loader.clone(), source)),
        });

        let mut canvas = Canvas::new(self.config.canvas_size);

        let base_label = base.describe();
        let base_image = decode_raster(self.loader.clone(), base)
            .await
            .map_err(|e| {
                tracing::warn!(base = %base_label, error = %e, "Base image decode failed");
                ShadowcasterError::base_decode(format!("{base_label}: {e}"))
            })?;
        // Dropping `overlay` on the error path aborts its decode.

        canvas.draw_fitted(&base_image, 1.0, self.config.resize_filter);
        tracing::debug!(
            base = %base_label,
            width = base_image.width(),
            height = base_image.height(),
            "Base committed to canvas"
        );

        Ok(PendingComposite {
            canvas,
            overlay,
            config: self.config.clone(),
        })
    }
}

impl std::fmt::Debug for CompositeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeRenderer")
            .field("config", &self.config)
            .field("loader", &self.loader.name())
            .finish()
    }
}

/// Overlay decode running in the background. Aborted if dropped unfinished.
struct OverlayTask {
    label: String,
    handle: JoinHandle<ShadowcasterResult<RgbaImage>>,
}

impl Drop for OverlayTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A composite whose base is drawn and whose overlay may still be decoding.
pub struct PendingComposite {
    canvas: Canvas,
    overlay: Option<OverlayTask>,
    config: CompositorConfig,
}

impl PendingComposite {
    /// Whether an overlay still has to be drawn.
    pub fn has_pending_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Export the canvas as it is now: the base-only composite.
    pub fn snapshot(&self) -> CompositeResult {
        CompositeResult::from_canvas(&self.canvas)
    }

    /// Wait for the overlay decode, draw it, and return the final composite.
    pub async fn finish(mut self) -> CompositeResult {
        if let Some(mut task) = self.overlay.take() {
            match (&mut task.handle).await {
                Ok(Ok(overlay)) => {
                    self.canvas.draw_fitted(
                        &overlay,
                        self.config.overlay_opacity,
                        self.config.resize_filter,
                    );
                    tracing::debug!(
                        overlay = %task.label,
                        opacity = self.config.overlay_opacity,
                        "Overlay blended"
                    );
                }
                Ok(Err(e)) => {
                    let degraded = ShadowcasterError::overlay_decode(format!("{}: {e}", task.label));
                    tracing::warn!(error = %degraded, "Rendering base-only composite");
                }
                Err(e) => {
                    let degraded = ShadowcasterError::overlay_decode(format!(
                        "{}: decode task failed: {e}",
                        task.label
                    ));
                    tracing::warn!(error = %degraded, "Rendering base-only composite");
                }
            }
        }
        tracing::info!(size = self.canvas.size(), "Composite ready");
        CompositeResult::from_canvas(&self.canvas)
    }
}

impl std::fmt::Debug for PendingComposite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingComposite")
            .field("size", &self.canvas.size())
            .field(
                "overlay",
                &self.overlay.as_ref().map(|task| task.label.as_str()),
            )
            .finish()
    }
}

/// Final square raster, ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeResult {
    image: RgbaImage,
}

impl CompositeResult {
    fn from_canvas(canvas: &Canvas) -> Self {
        Self {
            image: canvas.to_rgba_image(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Straight-alpha RGBA at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encode the buffer as PNG. Identical buffers give identical bytes.
    pub fn to_png_bytes(&self) -> ShadowcasterResult<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.image.write_to(&mut out, image::ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}
