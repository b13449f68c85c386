//! Composite a base portrait with an optional overlay and export the result.

use std::path::PathBuf;
use std::sync::Arc;

use shadowcaster_catalog_model::{Catalog, CompositeRequest, RasterSource};
use shadowcaster_common::config::AppConfig;
use shadowcaster_processing_core::{ImageValidator, LocalLoader, RasterLoader};
use shadowcaster_render_engine::{export_composite, CompositeRenderer, DirectorySink};

pub struct ComposeArgs {
    pub base: PathBuf,
    pub overlay: Option<PathBuf>,
    pub overlay_id: Option<String>,
    pub catalog: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub size: Option<u32>,
}

pub async fn run(config: &AppConfig, args: ComposeArgs) -> anyhow::Result<()> {
    let loader: Arc<dyn RasterLoader> = Arc::new(LocalLoader);
    let base = RasterSource::from_path(&args.base);

    let validator = ImageValidator::new(&config.validation, loader.clone());
    let dims = validator
        .check(&base)
        .await
        .map_err(|e| anyhow::anyhow!("Base image rejected: {e}"))?;
    println!(
        "Base: {} ({}x{})",
        args.base.display(),
        dims.width,
        dims.height
    );

    let request = match (args.overlay, args.overlay_id, args.catalog) {
        (Some(path), _, _) => {
            println!("Overlay: {}", path.display());
            CompositeRequest::with_overlay(base, RasterSource::from_path(path))
        }
        (None, Some(id), Some(catalog_path)) => {
            let catalog = Catalog::load(&catalog_path)
                .map_err(|e| anyhow::anyhow!("Failed to load catalog: {e}"))?;
            let request = CompositeRequest::from_selection(base, Some(&id), &catalog);
            match catalog.overlay(&id) {
                Some(overlay) => println!("Overlay: {} ({})", overlay.name, overlay.id),
                None => println!("Overlay: {id} not in catalog, rendering base only"),
            }
            request
        }
        _ => CompositeRequest::base_only(base),
    };

    let mut compositor = config.compositor.clone();
    if let Some(size) = args.size {
        if size == 0 {
            anyhow::bail!("--size must be positive");
        }
        compositor.canvas_size = size;
    }
    let renderer = CompositeRenderer::new(compositor, loader);
    tracing::debug!(
        overlay = request.has_overlay(),
        size = renderer.canvas_size(),
        "Compose request ready"
    );

    let result = renderer
        .render(request)
        .await
        .map_err(|e| anyhow::anyhow!("Composite failed: {e}"))?;

    let output_dir = args.output.unwrap_or_else(|| config.export.output_dir.clone());
    let file_name = args.name.unwrap_or_else(|| config.export.file_name.clone());
    let mut sink = DirectorySink::new(output_dir);
    let receipt = export_composite(&result, &mut sink, &file_name)?;

    match receipt.location {
        Some(path) => println!(
            "Exported {}x{} composite to {} ({} bytes)",
            result.width(),
            result.height(),
            path.display(),
            receipt.bytes
        ),
        None => println!("Exported {} ({} bytes)", receipt.file_name, receipt.bytes),
    }

    Ok(())
}
