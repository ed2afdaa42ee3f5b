use std::path::Path;
use std::sync::{Arc, Mutex};

use image::{Rgba, RgbaImage};
use mememaker_common::config::{EditorDefaults, FontConfig};
use mememaker_common::error::MemeError;
use mememaker_meme_model::{CanvasSize, ColorComponents, Meme, Offset, UNTITLED};
use mememaker_render_engine::{
    Compositor, ExportOptions, FontCatalog, ProgressCallback, RenderProgress, RenderService,
    RenderStage,
};

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn service() -> RenderService {
    let fonts = FontConfig {
        dirs: Vec::new(),
        ..FontConfig::default()
    };
    RenderService::new(Compositor::new(FontCatalog::new(fonts)))
}

fn canvas() -> CanvasSize {
    CanvasSize::new(200.0, 400.0)
}

fn meme_with_overlay() -> Meme {
    let mut meme = Meme::create("  ", &png(100, 200, [255, 255, 255, 255])).unwrap();
    meme.add_image_layer(&png(2, 2, [255, 0, 0, 255]), canvas(), &EditorDefaults::default())
        .unwrap();
    meme
}

fn recording() -> (Arc<Mutex<Vec<RenderStage>>>, ProgressCallback) {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);
    let callback: ProgressCallback = Box::new(move |p| sink.lock().unwrap().push(p.stage));
    (stages, callback)
}

fn recording_progress() -> (Arc<Mutex<Vec<RenderProgress>>>, ProgressCallback) {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let callback: ProgressCallback = Box::new(move |p| sink.lock().unwrap().push(p));
    (reports, callback)
}

#[tokio::test]
async fn save_produces_thumbnail_and_default_title() {
    let service = service();
    let meme = meme_with_overlay();
    let (stages, callback) = recording();

    let record = service.save(&meme, canvas(), Some(callback)).await.unwrap();

    assert_eq!(record.title(), UNTITLED);
    assert_eq!(record.id(), meme.id());
    assert_eq!(record.thumbnail().unwrap().dimensions().unwrap(), (100, 200));
    assert!(meme.thumbnail().is_none());

    let stages = stages.lock().unwrap().clone();
    assert_eq!(
        stages,
        vec![
            RenderStage::Decoding,
            RenderStage::Compositing,
            RenderStage::Encoding,
            RenderStage::Complete
        ]
    );
}

#[tokio::test]
async fn failed_save_reports_failure_and_clears_busy() {
    let service = service();
    let mut busy = service.subscribe_busy();
    let (stages, callback) = recording();

    let err = service
        .save(&Meme::new("no background"), canvas(), Some(callback))
        .await
        .unwrap_err();

    assert!(matches!(err, MemeError::MissingBaseImage));
    assert_eq!(*stages.lock().unwrap(), vec![RenderStage::Failed]);
    assert!(busy.has_changed().unwrap());
    assert!(!*busy.borrow_and_update());
    assert!(!service.is_busy());
}

#[tokio::test]
async fn concurrent_saves_both_complete() {
    let service = service();
    let a = meme_with_overlay();
    let b = meme_with_overlay();

    let (ra, rb) = tokio::join!(
        service.save(&a, canvas(), None),
        service.save(&b, canvas(), None)
    );

    assert_eq!(ra.unwrap().id(), a.id());
    assert_eq!(rb.unwrap().id(), b.id());
    assert!(!service.is_busy());
}

#[tokio::test]
async fn export_writes_png_with_base_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nested").join("meme.png");
    let service = service();

    let mut options = ExportOptions::new(&output);
    options.guides = true;
    let written = service
        .export(&meme_with_overlay(), canvas(), options, None)
        .await
        .unwrap();

    assert_eq!(written, output);
    let image = image::open(&output).unwrap();
    assert_eq!((image.width(), image.height()), (100, 200));
}

#[tokio::test]
async fn decode_rejects_garbage() {
    let service = service();
    let err = service.decode(b"nope".to_vec()).await.unwrap_err();
    assert!(matches!(err, MemeError::DecodeFailure { .. }));

    let bitmap = service.decode(png(3, 5, [0, 0, 0, 255])).await.unwrap();
    assert_eq!(bitmap.dimensions().unwrap(), (3, 5));
}

#[tokio::test]
async fn layer_counts_hold_through_completion() {
    let service = service();
    let mut meme = meme_with_overlay();
    meme.add_image_layer(&png(2, 2, [0, 0, 255, 255]), canvas(), &EditorDefaults::default())
        .unwrap();
    let (reports, callback) = recording_progress();

    service.save(&meme, canvas(), Some(callback)).await.unwrap();

    let reports = reports.lock().unwrap().clone();
    let last = reports.last().unwrap();
    assert_eq!(last.stage, RenderStage::Complete);
    assert_eq!((last.layers_done, last.total_layers), (2, 2));
    assert!(reports.iter().all(|r| r.total_layers == 2));
    assert!(reports.windows(2).all(|w| w[0].layers_done <= w[1].layers_done));
    assert!(reports.windows(2).all(|w| w[0].progress <= w[1].progress));
}

#[tokio::test]
async fn export_into_unusable_directory_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("taken");
    std::fs::write(&blocker, b"a file, not a directory").unwrap();
    let service = service();
    let (stages, callback) = recording();

    let err = service
        .export(
            &meme_with_overlay(),
            canvas(),
            ExportOptions::new(blocker.join("meme.png")),
            Some(callback),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MemeError::Io(_)));
    assert_eq!(stages.lock().unwrap().last(), Some(&RenderStage::Failed));
    assert!(!service.is_busy());
}

#[tokio::test]
async fn save_with_text_box_pinched_far_past_the_output() {
    let fonts = FontConfig {
        dirs: vec![Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")],
        files: Default::default(),
        ..FontConfig::default()
    };
    let service = RenderService::new(Compositor::new(FontCatalog::new(fonts)));
    let canvas = CanvasSize::new(100.0, 100.0);
    let mut meme = Meme::create("big", &png(1000, 1000, [255, 255, 255, 255])).unwrap();
    let id = meme
        .add_text_layer("TOP TEXT", ColorComponents::BLACK, "Arial", canvas, &EditorDefaults::default())
        .unwrap();

    let layer = meme.layer_mut(id).unwrap();
    let t = layer.transform_mut();
    t.width *= 500.0;
    t.height *= 500.0;
    t.scale = 500.0;
    let (w, h) = (t.width, t.height);
    t.place_at(Offset::new(50.0 - w / 2.0, 50.0 - h / 2.0));
    layer.scale_content(500.0);

    let record = service.save(&meme, canvas, None).await.unwrap();
    assert_eq!(record.thumbnail().unwrap().dimensions().unwrap(), (1000, 1000));
}
