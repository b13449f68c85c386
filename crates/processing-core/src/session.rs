//! Editor session state.
//!
//! Tracks what the user has picked while building one composite: the
//! presentation order of base portraits, the chosen base (catalog entry or
//! validated upload), and the chosen overlay. The presentation order is
//! computed once and only recomputed when the set of base images changes.

use shadowcaster_catalog_model::{BaseImage, Catalog, CompositeRequest, OverlayOption, RasterSource};
use shadowcaster_common::error::{ShadowcasterError, ShadowcasterResult};

use crate::shuffle::{PresentationShuffler, RandomSource, SplitMix64};
use crate::validation::{Dimensions, ImageValidator};

/// The base raster chosen for the current edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseSelection {
    /// A portrait from the catalog.
    Catalog { id: String, source: RasterSource },
    /// A custom upload that passed validation.
    Upload {
        source: RasterSource,
        dimensions: Dimensions,
    },
}

impl BaseSelection {
    pub fn source(&self) -> &RasterSource {
        match self {
            Self::Catalog { source, .. } | Self::Upload { source, .. } => source,
        }
    }
}

/// State of one editing session.
#[derive(Debug)]
pub struct EditorSession<R: RandomSource = SplitMix64> {
    catalog: Catalog,
    presentation: Vec<BaseImage>,
    shuffler: PresentationShuffler<R>,
    base: Option<BaseSelection>,
    overlay_id: Option<String>,
}

impl EditorSession<SplitMix64> {
    /// Session whose presentation order is seeded from the clock.
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self::new(catalog, PresentationShuffler::from_entropy())
    }
}

impl<R: RandomSource> EditorSession<R> {
    pub fn new(catalog: Catalog, mut shuffler: PresentationShuffler<R>) -> Self {
        let presentation = shuffler.shuffle(&catalog.base_images);
        Self {
            catalog,
            presentation,
            shuffler,
            base: None,
            overlay_id: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Base images in the order they should be displayed.
    pub fn presentation(&self) -> &[BaseImage] {
        &self.presentation
    }

    /// Replace the base image set. The presentation order is reshuffled
    /// only if the set of ids actually changed.
    pub fn set_base_images(&mut self, base_images: Vec<BaseImage>) {
        let unchanged = same_ids(&self.catalog.base_images, &base_images);
        self.catalog.base_images = base_images;
        if unchanged {
            // Keep the existing order but pick up edited names/descriptions.
            let catalog = &self.catalog;
            for shown in &mut self.presentation {
                if let Some(updated) = catalog.base_image(&shown.id) {
                    *shown = updated.clone();
                }
            }
            return;
        }
        self.presentation = self.shuffler.shuffle(&self.catalog.base_images);
        tracing::debug!(
            count = self.presentation.len(),
            "Base image set changed, presentation reshuffled"
        );
    }

    /// Replace the overlay set. A selected overlay that disappears simply
    /// stops resolving.
    pub fn set_overlays(&mut self, overlays: Vec<OverlayOption>) {
        self.catalog.overlays = overlays;
    }

    /// Pick a catalog portrait as the base.
    pub fn select_base(&mut self, id: &str) -> ShadowcasterResult<&BaseSelection> {
        let image = self
            .catalog
            .base_image(id)
            .ok_or_else(|| ShadowcasterError::catalog(format!("unknown base image: {id}")))?;
        let selection = BaseSelection::Catalog {
            id: image.id.clone(),
            source: image.source(),
        };
        Ok(&*self.base.insert(selection))
    }

    /// Validate and pick a custom upload as the base.
    ///
    /// On rejection the previous selection is kept.
    pub async fn select_upload(
        &mut self,
        source: RasterSource,
        validator: &ImageValidator,
    ) -> ShadowcasterResult<&BaseSelection> {
        let dimensions = validator.check(&source).await?;
        tracing::info!(
            source = %source.describe(),
            width = dimensions.width,
            height = dimensions.height,
            "Custom base image accepted"
        );
        Ok(&*self.base.insert(BaseSelection::Upload { source, dimensions }))
    }

    /// Choose an overlay by id, or `None` for no overlay.
    pub fn select_overlay(&mut self, overlay_id: Option<&str>) {
        self.overlay_id = overlay_id.map(str::to_string);
    }

    pub fn base(&self) -> Option<&BaseSelection> {
        self.base.as_ref()
    }

    pub fn overlay_id(&self) -> Option<&str> {
        self.overlay_id.as_deref()
    }

    /// The selected overlay record, if it exists in the catalog.
    pub fn overlay(&self) -> Option<&OverlayOption> {
        self.overlay_id
            .as_deref()
            .and_then(|id| self.catalog.overlay(id))
    }

    /// Whether a base has been chosen and the overlay editor is showing.
    pub fn is_editing(&self) -> bool {
        self.base.is_some()
    }

    /// Drop the base and overlay choices. The presentation order is kept.
    pub fn reset(&mut self) {
        self.base = None;
        self.overlay_id = None;
    }

    /// Build the render request for the current selection.
    pub fn composite_request(&self) -> Option<CompositeRequest> {
        let base = self.base.as_ref()?;
        Some(CompositeRequest::from_selection(
            base.source().clone(),
            self.overlay_id.as_deref(),
            &self.catalog,
        ))
    }
}

fn same_ids(a: &[BaseImage], b: &[BaseImage]) -> bool {
    let mut left: Vec<&str> = a.iter().map(|i| i.id.as_str()).collect();
    let mut right: Vec<&str> = b.iter().map(|i| i.id.as_str()).collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}
