//! Base image and overlay catalog records.
//!
//! Records mirror the rows maintained by the external admin workflow
//! (`id`, `name`, `description`, `image_url`). The engine never writes them
//! back; helpers here only shape records the way the admin workflow does.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::raster::RasterSource;

/// A decorative overlay that can be blended over a base portrait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayOption {
    /// Unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Short description shown under the thumbnail.
    pub description: String,

    /// Reference to the overlay raster.
    pub image_url: String,
}

/// A selectable base portrait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseImage {
    /// Unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Short description shown under the thumbnail.
    pub description: String,

    /// Reference to the base raster.
    pub image_url: String,
}

impl OverlayOption {
    /// Build an overlay record with the admin workflow's automatic naming:
    /// overlay number `n` is called `DSHAD{n}` and described as `#{n}`.
    pub fn numbered(id: impl Into<String>, number: usize, image_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: format!("DSHAD{number}"),
            description: format!("#{number}"),
            image_url: image_url.into(),
        }
    }

    /// Resolve the record's image reference.
    pub fn source(&self) -> RasterSource {
        RasterSource::from_reference(&self.image_url)
    }
}

impl BaseImage {
    /// Build a base image record. Name and description are trimmed and must
    /// both be non-empty.
    pub fn new(
        id: impl Into<String>,
        name: &str,
        description: &str,
        image_url: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let name = name.trim();
        let description = description.trim();
        if name.is_empty() || description.is_empty() {
            return Err(CatalogError::ValidationError {
                message: "base images need both a name and a description".to_string(),
            });
        }
        Ok(Self {
            id: id.into(),
            name: name.to_string(),
            description: description.to_string(),
            image_url: image_url.into(),
        })
    }

    /// Resolve the record's image reference.
    pub fn source(&self) -> RasterSource {
        RasterSource::from_reference(&self.image_url)
    }
}

/// Read-only set of base images and overlays supplied by the persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Selectable base portraits, newest first.
    #[serde(default)]
    pub base_images: Vec<BaseImage>,

    /// Available overlays, newest first.
    #[serde(default)]
    pub overlays: Vec<OverlayOption>,
}

impl Catalog {
    pub fn new(base_images: Vec<BaseImage>, overlays: Vec<OverlayOption>) -> Self {
        Self {
            base_images,
            overlays,
        }
    }

    /// The built-in overlay set used when no admin data is available.
    pub fn with_default_overlays() -> Self {
        let overlay = |id: &str, name: &str, url: &str, description: &str| OverlayOption {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            image_url: url.to_string(),
        };

        Self {
            base_images: Vec::new(),
            overlays: vec![
                overlay(
                    "frame1",
                    "Golden Frame",
                    "https://images.unsplash.com/photo-1579965342575-16428a7c8881?auto=format&fit=crop&w=800&q=80",
                    "Elegant golden frame overlay",
                ),
                overlay(
                    "frame2",
                    "Vintage Border",
                    "https://images.unsplash.com/photo-1584285418504-045785c9eedc?auto=format&fit=crop&w=800&q=80",
                    "Classic vintage border effect",
                ),
                overlay(
                    "frame3",
                    "Modern Lines",
                    "https://images.unsplash.com/photo-1603513492128-ba7bc9b3e143?auto=format&fit=crop&w=800&q=80",
                    "Contemporary geometric overlay",
                ),
            ],
        }
    }

    /// Parse a catalog from JSON and check that ids are unique.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self =
            serde_json::from_str(json).map_err(|e| CatalogError::ParseError {
                path: None,
                source: e,
            })?;
        catalog.check_unique_ids()?;
        Ok(catalog)
    }

    /// Load a catalog JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let catalog: Self =
            serde_json::from_str(&json).map_err(|e| CatalogError::ParseError {
                path: Some(path.to_path_buf()),
                source: e,
            })?;
        catalog.check_unique_ids()?;
        Ok(catalog)
    }

    /// Look up an overlay by id.
    pub fn overlay(&self, id: &str) -> Option<&OverlayOption> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// Look up a base image by id.
    pub fn base_image(&self, id: &str) -> Option<&BaseImage> {
        self.base_images.iter().find(|b| b.id == id)
    }

    /// Number the next overlay added through the admin workflow would get.
    pub fn next_overlay_number(&self) -> usize {
        self.overlays.len() + 1
    }

    fn check_unique_ids(&self) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for id in self.base_images.iter().map(|b| &b.id) {
            if !seen.insert(id.as_str()) {
                return Err(CatalogError::ValidationError {
                    message: format!("duplicate base image id: {id}"),
                });
            }
        }
        seen.clear();
        for id in self.overlays.iter().map(|o| &o.id) {
            if !seen.insert(id.as_str()) {
                return Err(CatalogError::ValidationError {
                    message: format!("duplicate overlay id: {id}"),
                });
            }
        }
        Ok(())
    }
}

/// Errors that can occur when reading catalog data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error{}: {source}", .path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    ParseError {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    #[error("Validation error: {message}")]
    ValidationError { message: String },
}
