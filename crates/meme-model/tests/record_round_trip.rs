use mememaker_common::config::EditorDefaults;
use mememaker_meme_model::{
    CanvasSize, ColorComponents, Layer, Meme, MemeLibrary, MemoryStore, Offset,
};

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A meme with `images` image layers and `texts` text layers, each carrying
/// awkward floating point values that only survive a lossless round trip.
fn populated_meme(images: usize, texts: usize) -> Meme {
    let canvas = CanvasSize::new(331.7, 512.25);
    let defaults = EditorDefaults::default();
    let mut meme = Meme::create("round trip", &png(64, 48, [12, 34, 56, 255])).unwrap();

    for i in 0..images {
        let id = meme
            .add_image_layer(&png(3, 3, [i as u8, 0, 0, 200]), canvas, &defaults)
            .unwrap();
        let t = meme.layer_mut(id).unwrap().transform_mut();
        t.place_at(Offset::new(0.1 + 0.2 * i as f64, -1.0 / 3.0));
        t.rotation_degrees = 359.999_999_999_9 - i as f64;
        t.width = 80.0 * std::f64::consts::E;
        t.original_width = t.width;
    }

    for i in 0..texts {
        let color = ColorComponents::new(0.1, 0.2, 0.3 + i as f64 * 0.01, 0.7);
        let id = meme
            .add_text_layer(format!("line {i}\nsecond"), color, "Georgia", canvas, &defaults)
            .unwrap();
        let t = meme.layer_mut(id).unwrap().transform_mut();
        t.place_at(Offset::new(1e-12, 123_456.789));
        t.rotation_degrees = std::f64::consts::PI;
    }

    meme
}

#[test]
fn meme_with_layers_round_trips_losslessly() {
    let meme = populated_meme(3, 4);
    let json = serde_json::to_string(&meme).unwrap();
    let parsed: Meme = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, meme);
    assert_eq!(parsed.image_layers().len(), 3);
    assert_eq!(parsed.text_layers().len(), 4);
    assert_eq!(
        parsed.image_layers()[1].transform.offset.width.to_bits(),
        meme.image_layers()[1].transform.offset.width.to_bits()
    );
}

#[test]
fn library_round_trips_through_store() {
    let mut library = MemeLibrary::new();
    library.upsert(populated_meme(1, 0));
    library.upsert(populated_meme(0, 2));
    library.upsert(Meme::new("no background yet"));

    let mut store = MemoryStore::new();
    library.persist(&mut store).unwrap();
    let reloaded = MemeLibrary::load(&store).unwrap();

    assert_eq!(reloaded, library);
    let titles: Vec<_> = reloaded.iter().map(|m| m.title()).collect();
    assert_eq!(titles, vec!["round trip", "round trip", "no background yet"]);
}

#[test]
fn records_written_with_uppercase_ids_are_accepted() {
    let meme = populated_meme(1, 1);
    let json = serde_json::to_string(&meme).unwrap();
    let upper = json.replace(
        &meme.id().to_string(),
        &meme.id().to_string().to_ascii_uppercase(),
    );

    let parsed: Meme = serde_json::from_str(&upper).unwrap();
    assert_eq!(parsed.id(), meme.id());
}
