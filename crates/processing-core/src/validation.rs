//! Upload validation.
//!
//! A candidate is accepted when it is an image and its width and height
//! differ by less than an absolute pixel tolerance (2 by default, so a
//! single pixel of encoder rounding is absorbed). The tolerance is the same
//! for every image size.

use std::sync::Arc;

use shadowcaster_catalog_model::RasterSource;
use shadowcaster_common::config::ValidationConfig;
use shadowcaster_common::error::{ShadowcasterError, ShadowcasterResult};

use crate::loader::{probe_dimensions_async, sniff_mime, LocalLoader, RasterLoader};

/// Pixel dimensions of a probed raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether `|width - height| < tolerance_px`.
    pub fn is_square_within(&self, tolerance_px: u32) -> bool {
        self.width.abs_diff(self.height) < tolerance_px
    }
}

/// Decides whether a candidate raster may be used as a base image.
#[derive(Clone)]
pub struct ImageValidator {
    tolerance_px: u32,
    loader: Arc<dyn RasterLoader>,
}

impl ImageValidator {
    pub fn new(config: &ValidationConfig, loader: Arc<dyn RasterLoader>) -> Self {
        Self {
            tolerance_px: config.square_tolerance_px,
            loader,
        }
    }

    /// Validator with default tolerance reading memory and file sources.
    pub fn with_defaults() -> Self {
        Self::new(&ValidationConfig::default(), Arc::new(LocalLoader))
    }

    pub fn tolerance_px(&self) -> u32 {
        self.tolerance_px
    }

    /// Check a candidate, reporting why it was rejected.
    ///
    /// Only the image header is read; the bytes are dropped once the
    /// dimensions are known.
    pub async fn check(&self, source: &RasterSource) -> ShadowcasterResult<Dimensions> {
        let declared = source.declared_mime();
        if let Some(mime) = declared.as_deref() {
            if !mime.starts_with("image/") {
                tracing::debug!(source = %source.describe(), mime, "Rejected non-image upload");
                return Err(ShadowcasterError::unsupported_media(mime));
            }
        }

        let bytes = self.loader.load(source).await?;

        if declared.is_none() && sniff_mime(&bytes).is_none() {
            tracing::debug!(source = %source.describe(), "Rejected upload with unknown content");
            return Err(ShadowcasterError::unsupported_media(
                "application/octet-stream",
            ));
        }

        let (width, height) = probe_dimensions_async(bytes).await.map_err(|e| {
            tracing::debug!(source = %source.describe(), error = %e, "Upload header unreadable");
            ShadowcasterError::unsupported_media(
                declared
                    .clone()
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
            )
        })?;

        let dimensions = Dimensions::new(width, height);
        if !dimensions.is_square_within(self.tolerance_px) {
            tracing::debug!(
                source = %source.describe(),
                width,
                height,
                tolerance_px = self.tolerance_px,
                "Rejected non-square upload"
            );
            return Err(ShadowcasterError::aspect_ratio(width, height));
        }

        Ok(dimensions)
    }

    /// `true` when [`ImageValidator::check`] accepts the candidate.
    pub async fn is_acceptable(&self, source: &RasterSource) -> bool {
        self.check(source).await.is_ok()
    }
}

impl std::fmt::Debug for ImageValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageValidator")
            .field("tolerance_px", &self.tolerance_px)
            .field("loader", &self.loader.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn upload(width: u32, height: u32) -> RasterSource {
        RasterSource::from_upload(png_bytes(width, height), "image/png")
    }

    #[tokio::test]
    async fn test_near_square_accepted() {
        let validator = ImageValidator::with_defaults();
        assert!(validator.is_acceptable(&upload(100, 100)).await);
        assert!(validator.is_acceptable(&upload(100, 101)).await);
        assert!(validator.is_acceptable(&upload(101, 100)).await);
    }

    #[tokio::test]
    async fn test_non_square_rejected() {
        let validator = ImageValidator::with_defaults();
        assert!(!validator.is_acceptable(&upload(100, 150)).await);
        assert!(!validator.is_acceptable(&upload(100, 102)).await);

        let err = validator.check(&upload(100, 150)).await.unwrap_err();
        assert!(matches!(
            err,
            ShadowcasterError::AspectRatioRejected {
                width: 100,
                height: 150
            }
        ));
    }

    #[tokio::test]
    async fn test_declared_non_image_rejected() {
        let validator = ImageValidator::with_defaults();
        let source = RasterSource::from_upload(png_bytes(10, 10), "text/plain");
        let err = validator.check(&source).await.unwrap_err();
        assert!(matches!(err, ShadowcasterError::UnsupportedMedia { .. }));
    }

    #[tokio::test]
    async fn test_undeclared_garbage_rejected() {
        let validator = ImageValidator::with_defaults();
        let source = RasterSource::from_bytes(b"definitely not an image".to_vec());
        assert!(matches!(
            validator.check(&source).await,
            Err(ShadowcasterError::UnsupportedMedia { .. })
        ));
    }

    #[tokio::test]
    async fn test_undeclared_png_is_sniffed() {
        let validator = ImageValidator::with_defaults();
        let source = RasterSource::from_bytes(png_bytes(32, 32));
        assert_eq!(
            validator.check(&source).await.unwrap(),
            Dimensions::new(32, 32)
        );
    }

    #[tokio::test]
    async fn test_declared_image_with_corrupt_bytes_rejected() {
        let validator = ImageValidator::with_defaults();
        let source = RasterSource::from_upload(b"\x89PNG garbage".to_vec(), "image/png");
        assert!(matches!(
            validator.check(&source).await,
            Err(ShadowcasterError::UnsupportedMedia { .. })
        ));
    }

    #[test]
    fn test_large_images_use_absolute_tolerance() {
        assert!(Dimensions::new(10_000, 10_001).is_square_within(2));
        assert!(!Dimensions::new(10_000, 10_002).is_square_within(2));
    }

    proptest! {
        #[test]
        fn prop_square_iff_difference_below_two(width in 1u32..20_000, height in 1u32..20_000) {
            let square = Dimensions::new(width, height).is_square_within(2);
            prop_assert_eq!(square, width.abs_diff(height) < 2);
        }

        #[test]
        fn prop_validator_matches_threshold(width in 1u32..48, delta in 0u32..4) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let validator = ImageValidator::with_defaults();
            let accepted = runtime.block_on(validator.is_acceptable(&upload(width, width + delta)));
            prop_assert_eq!(accepted, delta < 2);
        }
    }
}
