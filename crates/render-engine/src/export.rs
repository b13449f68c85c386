//! Composite export.
//!
//! A finished [`CompositeResult`] is encoded as PNG and handed to an
//! [`ExportSink`]. [`DirectorySink`] writes a downloadable file;
//! [`MemorySink`] keeps the bytes for whatever publishes them next.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use shadowcaster_common::config::ExportConfig;
use shadowcaster_common::error::{ShadowcasterError, ShadowcasterResult};

use crate::compositor::CompositeResult;

/// Record of one completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub file_name: String,
    pub bytes: usize,
    /// Where the file landed, for sinks that write to disk.
    pub location: Option<PathBuf>,
    pub exported_at: DateTime<Utc>,
}

/// Destination for encoded composites.
pub trait ExportSink: Send {
    /// Sink name for logs.
    fn name(&self) -> &str;

    /// Store one encoded PNG under `file_name`.
    fn accept(&mut self, file_name: &str, png: &[u8]) -> ShadowcasterResult<ExportReceipt>;
}

/// Writes exports into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn name(&self) -> &str {
        "directory"
    }

    fn accept(&mut self, file_name: &str, png: &[u8]) -> ShadowcasterResult<ExportReceipt> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            ShadowcasterError::export(format!("cannot create {}: {e}", self.dir.display()))
        })?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, png)
            .map_err(|e| ShadowcasterError::export(format!("cannot write {}: {e}", path.display())))?;

        Ok(ExportReceipt {
            file_name: file_name.to_string(),
            bytes: png.len(),
            location: Some(path),
            exported_at: Utc::now(),
        })
    }
}

/// An export held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub file_name: String,
    pub png: Vec<u8>,
}

/// Collects exports in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    exports: Vec<ExportedImage>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exports(&self) -> &[ExportedImage] {
        &self.exports
    }

    /// Hand over everything collected so far.
    pub fn take(&mut self) -> Vec<ExportedImage> {
        std::mem::take(&mut self.exports)
    }
}

impl ExportSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn accept(&mut self, file_name: &str, png: &[u8]) -> ShadowcasterResult<ExportReceipt> {
        self.exports.push(ExportedImage {
            file_name: file_name.to_string(),
            png: png.to_vec(),
        });
        Ok(ExportReceipt {
            file_name: file_name.to_string(),
            bytes: png.len(),
            location: None,
            exported_at: Utc::now(),
        })
    }
}

/// Encode `result` as PNG and hand it to `sink`.
///
/// `file_name` must be a bare file name; a missing `.png` extension is
/// appended.
pub fn export_composite(
    result: &CompositeResult,
    sink: &mut dyn ExportSink,
    file_name: &str,
) -> ShadowcasterResult<ExportReceipt> {
    let file_name = normalize_file_name(file_name)?;
    let png = result.to_png_bytes()?;
    let receipt = sink.accept(&file_name, &png)?;
    tracing::info!(
        sink = sink.name(),
        file = %receipt.file_name,
        bytes = receipt.bytes,
        "Composite exported"
    );
    Ok(receipt)
}

/// Export to the directory and file name from configuration.
pub fn export_with_config(
    result: &CompositeResult,
    config: &ExportConfig,
) -> ShadowcasterResult<ExportReceipt> {
    let mut sink = DirectorySink::new(&config.output_dir);
    export_composite(result, &mut sink, &config.file_name)
}

fn normalize_file_name(file_name: &str) -> ShadowcasterResult<String> {
    let trimmed = file_name.trim();
    if trimmed.is_empty() {
        return Err(ShadowcasterError::export("export file name is empty"));
    }
    if trimmed.contains(&['/', '\\'][..]) || trimmed == "." || trimmed == ".." {
        return Err(ShadowcasterError::export(format!(
            "export file name must not contain a path: {trimmed}"
        )));
    }
    if Path::new(trimmed)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}.png"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::CompositeRenderer;
    use shadowcaster_catalog_model::{CompositeRequest, RasterSource};
    use std::io::Cursor;

    async fn composite() -> CompositeResult {
        let img = image::RgbaImage::from_pixel(400, 400, image::Rgba([40, 80, 120, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        CompositeRenderer::with_defaults()
            .render(CompositeRequest::base_only(RasterSource::from_bytes(
                out.into_inner(),
            )))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_directory_sink_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            output_dir: dir.path().join("downloads"),
            ..ExportConfig::default()
        };
        let result = composite().await;

        let receipt = export_with_config(&result, &config).unwrap();
        let path = receipt.location.unwrap();
        assert_eq!(path, dir.path().join("downloads").join("edited-image.png"));

        let written = image::open(&path).unwrap().to_rgba8();
        assert_eq!(&written, result.as_image());
    }

    #[tokio::test]
    async fn test_memory_sink_collects_exports() {
        let result = composite().await;
        let mut sink = MemorySink::new();
        let receipt = export_composite(&result, &mut sink, "portrait").unwrap();

        assert_eq!(receipt.file_name, "portrait.png");
        assert!(receipt.location.is_none());

        let exports = sink.take();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].png.len(), receipt.bytes);
        assert!(sink.exports().is_empty());
    }

    #[test]
    fn test_file_name_rules() {
        assert_eq!(normalize_file_name("a.PNG").unwrap(), "a.PNG");
        assert_eq!(normalize_file_name(" out ").unwrap(), "out.png");
        assert!(normalize_file_name("").is_err());
        assert!(normalize_file_name("../escape.png").is_err());
        assert!(normalize_file_name("..").is_err());
    }
}
