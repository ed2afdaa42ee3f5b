//! Show a meme and its layers.

use mememaker_common::config::AppConfig;
use mememaker_meme_model::layer::LayerKind;

use super::Workspace;

pub fn run(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let workspace = Workspace::open(config)?;
    let meme = workspace.find(query)?;

    println!("Meme: {}", meme.title());
    println!("  ID: {}", meme.id());
    match meme.base_image() {
        Some(base) => match base.dimensions() {
            Ok((w, h)) => println!("  Background: {w}x{h} ({} bytes)", base.len()),
            Err(e) => println!("  Background: unreadable ({e})"),
        },
        None => println!("  Background: none"),
    }
    println!(
        "  Thumbnail: {}",
        if meme.thumbnail().is_some() { "cached" } else { "none" }
    );
    println!();

    println!("Layers (paint order):");
    if meme.layer_count() == 0 {
        println!("  none");
    }
    for (index, layer) in meme.layers().enumerate() {
        let t = layer.transform();
        let kind = match layer.kind() {
            LayerKind::Image => "image",
            LayerKind::Text => "text",
        };
        println!(
            "  [{index}] {kind:<5} {}  at ({:.1}, {:.1})  {:.1}x{:.1}  {:.1}°",
            layer.id(),
            t.offset.width,
            t.offset.height,
            t.width,
            t.height,
            t.rotation_degrees
        );
        if let Some(text) = meme.text_layer(layer.id()) {
            println!(
                "        {:?} in {} {:.1}pt {}",
                text.text,
                text.font_name,
                text.font_size,
                text.color_components.to_hex()
            );
        }
    }
    Ok(())
}
