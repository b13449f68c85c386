//! Validate a candidate base image.

use std::path::PathBuf;
use std::sync::Arc;

use shadowcaster_catalog_model::RasterSource;
use shadowcaster_common::config::AppConfig;
use shadowcaster_processing_core::{ImageValidator, LocalLoader};

pub async fn run(config: &AppConfig, file: PathBuf) -> anyhow::Result<()> {
    println!("Validating image at: {}", file.display());

    let validator = ImageValidator::new(&config.validation, Arc::new(LocalLoader));
    let source = RasterSource::from_path(&file);

    tracing::debug!(?validator, source = %source.describe(), "Running upload validation");
    match validator.check(&source).await {
        Ok(dims) => {
            println!("  Dimensions: {}x{}", dims.width, dims.height);
            println!("  Tolerance: {}px", validator.tolerance_px());
            println!("\nImage is acceptable as a base portrait.");
            Ok(())
        }
        Err(e) if e.is_user_facing() => {
            println!("\nRejected: {e}");
            Err(anyhow::anyhow!("image rejected"))
        }
        Err(e) => Err(anyhow::anyhow!("Failed to validate image: {e}")),
    }
}
