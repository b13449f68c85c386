//! Per-render composite requests.

use crate::catalog::Catalog;
use crate::raster::RasterSource;

/// A base raster paired with an optional overlay, built fresh for each render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRequest {
    /// The portrait drawn first, at full opacity.
    pub base: RasterSource,

    /// The decorative layer blended on top, if any.
    pub overlay: Option<RasterSource>,
}

impl CompositeRequest {
    pub fn base_only(base: RasterSource) -> Self {
        Self {
            base,
            overlay: None,
        }
    }

    pub fn with_overlay(base: RasterSource, overlay: RasterSource) -> Self {
        Self {
            base,
            overlay: Some(overlay),
        }
    }

    /// Build a request from a selected overlay id.
    ///
    /// An id that is absent from the catalog yields a base-only request, the
    /// same as selecting no overlay at all.
    pub fn from_selection(base: RasterSource, overlay_id: Option<&str>, catalog: &Catalog) -> Self {
        let overlay = overlay_id
            .and_then(|id| catalog.overlay(id))
            .map(|overlay| overlay.source());
        Self { base, overlay }
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OverlayOption;

    fn catalog() -> Catalog {
        Catalog::new(
            Vec::new(),
            vec![OverlayOption::numbered("o1", 1, "overlays/one.png")],
        )
    }

    #[test]
    fn test_selection_resolves_overlay() {
        let base = RasterSource::from_path("base.png");
        let request = CompositeRequest::from_selection(base.clone(), Some("o1"), &catalog());
        assert_eq!(request.base, base);
        assert_eq!(
            request.overlay,
            Some(RasterSource::from_path("overlays/one.png"))
        );
    }

    #[test]
    fn test_unknown_overlay_is_base_only() {
        let base = RasterSource::from_path("base.png");
        let request = CompositeRequest::from_selection(base.clone(), Some("nope"), &catalog());
        assert_eq!(request, CompositeRequest::base_only(base));
        assert!(!request.has_overlay());
    }
}
