//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ShadowcasterError, ShadowcasterResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Compositing parameters.
    pub compositor: CompositorConfig,

    /// Upload validation parameters.
    pub validation: ValidationConfig,

    /// Export (download) parameters.
    pub export: ExportConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Compositing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Side length of the square output buffer in pixels.
    pub canvas_size: u32,

    /// Opacity applied when drawing the overlay, in `[0.0, 1.0]`.
    pub overlay_opacity: f32,

    /// Resampling filter used to fit sources to the canvas.
    pub resize_filter: ResizeFilter,
}

/// Resampling filter used when stretching a source onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

/// Upload validation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Absolute pixel tolerance: an image is square when
    /// `|width - height| < square_tolerance_px`.
    pub square_tolerance_px: u32,
}

/// Export parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name used for downloaded composites.
    pub file_name: String,

    /// Directory downloads are written to.
    pub output_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "shadowcaster=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            canvas_size: 400,
            overlay_opacity: 0.5,
            resize_filter: ResizeFilter::Triangle,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            square_tolerance_px: 2,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "edited-image.png".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: impl AsRef<Path>) -> ShadowcasterResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ShadowcasterError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Reject values the compositor cannot work with.
    pub fn validate(&self) -> ShadowcasterResult<()> {
        if self.compositor.canvas_size == 0 {
            return Err(ShadowcasterError::config("canvas_size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.compositor.overlay_opacity) {
            return Err(ShadowcasterError::config(format!(
                "overlay_opacity must be within [0, 1], got {}",
                self.compositor.overlay_opacity
            )));
        }
        if self.validation.square_tolerance_px == 0 {
            return Err(ShadowcasterError::config(
                "square_tolerance_px must be at least 1",
            ));
        }
        if self.export.file_name.trim().is_empty() {
            return Err(ShadowcasterError::config("export file_name is empty"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("shadowcaster").join("config.json")
}
