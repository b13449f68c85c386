//! Print a catalog's base portraits in presentation order.

use std::path::PathBuf;

use shadowcaster_catalog_model::Catalog;
use shadowcaster_processing_core::{EditorSession, PresentationShuffler};

pub fn run(catalog: PathBuf, seed: Option<u64>) -> anyhow::Result<()> {
    let catalog = Catalog::load(&catalog)
        .map_err(|e| anyhow::anyhow!("Failed to load catalog: {e}"))?;

    let overlays = catalog.overlays.len();
    let session = match seed {
        Some(seed) => EditorSession::new(catalog, PresentationShuffler::seeded(seed)),
        None => EditorSession::from_catalog(catalog),
    };

    println!("Base portraits:");
    for (i, base) in session.presentation().iter().enumerate() {
        println!("  {:>2}. {} ({}) - {}", i + 1, base.name, base.id, base.description);
    }
    println!();
    println!("Overlays available: {overlays}");

    Ok(())
}
