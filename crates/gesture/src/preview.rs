//! What the live preview draws, in paint order.

use mememaker_meme_model::bitmap::Bitmap;
use mememaker_meme_model::color::ColorComponents;
use mememaker_meme_model::geometry::Offset;
use mememaker_meme_model::layer::{Layer, LayerId, LayerKind};
use mememaker_meme_model::meme::Meme;

use crate::mapper::{GestureMapper, InteractionState};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawContent<'a> {
    Image(&'a Bitmap),
    Text {
        text: &'a str,
        color: ColorComponents,
        font_name: &'a str,
        font_size: f64,
    },
}

/// One overlay as the preview should draw it right now.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem<'a> {
    pub id: LayerId,
    pub kind: LayerKind,
    /// Top-left of the unrotated box.
    pub offset: Offset,
    pub rotation_degrees: f64,
    pub width: f64,
    pub height: f64,
    pub content: DrawContent<'a>,
    /// A gesture is holding uncommitted values on this layer.
    pub interacting: bool,
}

/// Overlays in paint order, using live transform values.
pub fn draw_list<'a>(meme: &'a Meme, gestures: &GestureMapper) -> Vec<DrawItem<'a>> {
    let images = meme
        .image_layers()
        .iter()
        .map(|layer| item(layer, DrawContent::Image(&layer.image_data), gestures));
    let texts = meme.text_layers().iter().map(|layer| {
        item(
            layer,
            DrawContent::Text {
                text: &layer.text,
                color: layer.color_components,
                font_name: &layer.font_name,
                font_size: layer.font_size,
            },
            gestures,
        )
    });
    images.chain(texts).collect()
}

/// The topmost layer under a canvas point, if any.
pub fn hit_test(meme: &Meme, x: f64, y: f64) -> Option<LayerId> {
    let layers: Vec<&dyn Layer> = meme.layers().collect();
    layers
        .into_iter()
        .rev()
        .find(|layer| layer.transform().contains_point(x, y))
        .map(|layer| layer.id())
}

fn item<'a, L: Layer>(layer: &L, content: DrawContent<'a>, gestures: &GestureMapper) -> DrawItem<'a> {
    let t = layer.transform();
    DrawItem {
        id: layer.id(),
        kind: layer.kind(),
        offset: t.offset,
        rotation_degrees: t.rotation_degrees,
        width: t.width,
        height: t.height,
        content,
        interacting: gestures.state(layer.id()) == InteractionState::Interacting,
    }
}
