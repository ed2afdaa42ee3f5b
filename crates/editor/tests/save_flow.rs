use image::{Rgba, RgbaImage};
use mememaker_common::config::{EditorDefaults, FontConfig};
use mememaker_common::error::MemeError;
use mememaker_editor::EditorSession;
use mememaker_gesture::{GestureChannel, GestureEvent};
use mememaker_meme_model::{
    ColorComponents, JsonFileStore, MemeLibrary, Offset, UNTITLED,
};
use mememaker_render_engine::{Compositor, FontCatalog, RenderService};

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

fn defaults() -> EditorDefaults {
    EditorDefaults {
        canvas_width: 200.0,
        canvas_height: 400.0,
        ..EditorDefaults::default()
    }
}

#[tokio::test]
async fn edit_save_and_reload_scenario() {
    let service = service();
    let mut session = EditorSession::new(defaults());
    session.load_background(&png(400, 800, [255, 255, 255, 255])).unwrap();
    let id = session.add_overlay_image(&png(8, 8, [255, 0, 0, 255])).unwrap();

    for event in [
        GestureEvent::Began(GestureChannel::Drag),
        GestureEvent::DragChanged {
            translation: Offset::new(20.0, -10.0),
        },
        GestureEvent::Ended(GestureChannel::Drag),
        GestureEvent::Began(GestureChannel::Pinch),
        GestureEvent::PinchChanged { factor: 1.5 },
        GestureEvent::Ended(GestureChannel::Pinch),
    ] {
        session.gesture(id, event).unwrap();
    }

    let record = session.save(&service, None).await.unwrap();
    assert_eq!(record.title(), UNTITLED);
    assert_eq!(record.thumbnail().unwrap().dimensions().unwrap(), (400, 800));

    let layer = record.image_layer(id).unwrap();
    assert_eq!(layer.transform.offset, Offset::new(80.0, 150.0));
    assert_eq!(layer.transform.width, 120.0);
    assert_eq!(layer.transform.scale, 1.0);

    // the thumbnail shows the moved, enlarged overlay at 2x output scale
    let thumb = record.thumbnail().unwrap().decode().unwrap().to_rgba8();
    assert_eq!(thumb.get_pixel(170, 310).0, [255, 0, 0, 255]);
    assert_eq!(thumb.get_pixel(150, 310).0, [255, 255, 255, 255]);

    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path());
    let mut library = MemeLibrary::new();
    library.upsert(record.clone());
    library.persist(&mut store).unwrap();

    let reloaded = MemeLibrary::load(&store).unwrap();
    assert_eq!(reloaded.get(record.id()), Some(&record));
}

#[tokio::test]
async fn saving_without_background_leaves_session_untouched() {
    let service = service();
    let mut session = EditorSession::new(defaults());
    session.set_title("draft");
    let before = session.meme().clone();

    let err = session.save(&service, None).await.unwrap_err();
    assert!(matches!(err, MemeError::MissingBaseImage));
    assert!(err.is_user_correctable());
    assert_eq!(session.meme(), &before);
}

#[tokio::test]
async fn clear_after_save_starts_over() {
    let service = service();
    let mut session = EditorSession::new(defaults());
    session.load_background(&png(10, 10, [0, 0, 0, 255])).unwrap();
    session
        .add_text("", Some(ColorComponents::WHITE), "Arial")
        .unwrap();
    session.set_title("keeper");
    let saved = session.save(&service, None).await.unwrap();
    assert_eq!(saved.title(), "keeper");

    session.clear();
    assert_eq!(session.meme().title(), "");
    assert_eq!(session.meme().layer_count(), 0);
    assert!(session.meme().thumbnail().is_none());
}
