use std::io::Cursor;
use std::sync::Arc;

use shadowcaster_catalog_model::{Catalog, CompositeRequest, RasterSource};
use shadowcaster_common::config::{CompositorConfig, ExportConfig};
use shadowcaster_processing_core::{EditorSession, MemoryLoader, PresentationShuffler};
use shadowcaster_render_engine::{export_with_config, CompositeRenderer};

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("png encode");
    out.into_inner()
}

fn within_one(got: [u8; 4], want: [u8; 4]) -> bool {
    got.iter()
        .zip(want.iter())
        .all(|(g, w)| (i32::from(*g) - i32::from(*w)).abs() <= 1)
}

/// Catalog whose overlay URLs resolve through an in-memory table.
fn fixture() -> (Catalog, Arc<MemoryLoader>) {
    let catalog = Catalog::from_json(
        r##"{
            "base_images": [
                {"id": "red", "name": "Red", "description": "solid red", "image_url": "https://cdn.test/red.png"}
            ],
            "overlays": [
                {"id": "frame1", "name": "DSHAD1", "description": "#1", "image_url": "https://cdn.test/blue.png"},
                {"id": "frame2", "name": "DSHAD2", "description": "#2", "image_url": "https://cdn.test/clear.png"}
            ]
        }"##,
    )
    .expect("fixture catalog");

    let loader = MemoryLoader::new()
        .with("https://cdn.test/red.png", png(600, 600, [255, 0, 0, 255]))
        .with("https://cdn.test/blue.png", png(200, 200, [0, 0, 255, 255]))
        .with("https://cdn.test/clear.png", png(50, 50, [0, 0, 0, 0]));
    (catalog, Arc::new(loader))
}

#[tokio::test]
async fn catalog_selection_renders_expected_pixels() {
    let (catalog, loader) = fixture();
    let renderer = CompositeRenderer::new(CompositorConfig::default(), loader);
    let mut session = EditorSession::new(catalog, PresentationShuffler::seeded(7));

    session.select_base("red").unwrap();
    session.select_overlay(Some("frame1"));
    let blended = renderer
        .render(session.composite_request().unwrap())
        .await
        .unwrap();
    assert_eq!((blended.width(), blended.height()), (400, 400));
    for (x, y) in [(0, 0), (199, 201), (399, 0), (0, 399), (399, 399)] {
        let px = blended.pixel(x, y).unwrap();
        assert!(within_one(px, [127, 0, 127, 255]), "{px:?} at ({x},{y})");
    }

    // A fully transparent overlay leaves the base untouched.
    session.select_overlay(Some("frame2"));
    let clear = renderer
        .render(session.composite_request().unwrap())
        .await
        .unwrap();
    assert!(clear
        .as_image()
        .pixels()
        .all(|p| within_one(p.0, [255, 0, 0, 255])));

    // An unknown overlay id renders the base alone.
    session.select_overlay(Some("frame9"));
    let request = session.composite_request().unwrap();
    assert!(!request.has_overlay());
    let base_only = renderer.render(request).await.unwrap();
    assert_eq!(base_only, clear);
}

#[tokio::test]
async fn overlay_opacity_follows_config() {
    let (_, loader) = fixture();
    let config = CompositorConfig {
        canvas_size: 32,
        overlay_opacity: 1.0,
        ..CompositorConfig::default()
    };
    let renderer = CompositeRenderer::new(config, loader);
    let result = renderer
        .render(CompositeRequest::with_overlay(
            RasterSource::from_reference("https://cdn.test/red.png"),
            RasterSource::from_reference("https://cdn.test/blue.png"),
        ))
        .await
        .unwrap();
    assert_eq!((result.width(), result.height()), (32, 32));
    assert!(within_one(result.pixel(16, 16).unwrap(), [0, 0, 255, 255]));
}

#[tokio::test]
async fn exported_download_roundtrips_through_disk() {
    let (_, loader) = fixture();
    let renderer = CompositeRenderer::new(CompositorConfig::default(), loader);
    let result = renderer
        .render(CompositeRequest::with_overlay(
            RasterSource::from_reference("https://cdn.test/red.png"),
            RasterSource::from_reference("https://cdn.test/blue.png"),
        ))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig {
        output_dir: dir.path().to_path_buf(),
        ..ExportConfig::default()
    };
    let receipt = export_with_config(&result, &config).unwrap();
    assert_eq!(receipt.file_name, "edited-image.png");

    let reloaded = image::open(receipt.location.unwrap()).unwrap().to_rgba8();
    assert_eq!(&reloaded, result.as_image());
}
