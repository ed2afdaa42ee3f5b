//! Move, rotate, or scale a layer.
//!
//! Each requested change is replayed as a complete gesture (began, changed,
//! ended) so the layer ends up committed exactly as it would after a touch.

use mememaker_common::config::AppConfig;
use mememaker_gesture::mapper::{GestureChannel, GestureEvent};
use mememaker_meme_model::geometry::Offset;

use super::{resolve_layer, Workspace};

pub async fn run(
    config: &AppConfig,
    query: &str,
    layer: &str,
    dx: f64,
    dy: f64,
    rotate: Option<f64>,
    scale: Option<f64>,
) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(config)?;
    let mut session = workspace.edit(query)?;
    let layer = resolve_layer(session.meme(), layer)?;

    let mut gestures = Vec::new();
    if dx != 0.0 || dy != 0.0 {
        gestures.push((
            GestureChannel::Drag,
            GestureEvent::DragChanged {
                translation: Offset::new(dx, dy),
            },
        ));
    }
    if let Some(degrees) = rotate {
        gestures.push((GestureChannel::Rotate, GestureEvent::RotateChanged { degrees }));
    }
    if let Some(factor) = scale {
        gestures.push((GestureChannel::Pinch, GestureEvent::PinchChanged { factor }));
    }
    if gestures.is_empty() {
        return Err(anyhow::anyhow!(
            "Nothing to do. Pass --dx/--dy, --rotate, or --scale"
        ));
    }

    for (channel, change) in gestures {
        for event in [
            GestureEvent::Began(channel),
            change,
            GestureEvent::Ended(channel),
        ] {
            if let Err(e) = session.gesture(layer, event) {
                session.gesture(layer, GestureEvent::Cancelled)?;
                return Err(anyhow::anyhow!("Gesture rejected: {e}"));
            }
        }
    }

    let record = workspace.save(&mut session).await?;
    if let Some(l) = record.layer(layer) {
        let t = l.transform();
        println!(
            "Layer {layer}: at ({:.1}, {:.1})  {:.1}x{:.1}  {:.1}°",
            t.offset.width, t.offset.height, t.width, t.height, t.rotation_degrees
        );
    }
    Ok(())
}
