//! Overlay layers: images and styled text painted over the base image.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bitmap::Bitmap;
use crate::color::ColorComponents;
use crate::geometry::Transform;

/// Identifier shared by both layer kinds.
pub type LayerId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Image,
    Text,
}

/// Behaviour common to every overlay layer. Gestures only ever reach a layer
/// through this trait.
pub trait Layer {
    fn id(&self) -> LayerId;

    fn kind(&self) -> LayerKind;

    fn transform(&self) -> &Transform;

    fn transform_mut(&mut self) -> &mut Transform;

    /// Scale content that grows with the box (font size) by a live pinch
    /// factor, relative to its committed size.
    fn scale_content(&mut self, _factor: f64) {}

    /// Make the live content scale the committed one.
    fn commit_content_scale(&mut self) {}
}

/// A bitmap overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLayer {
    pub id: LayerId,
    pub image_data: Bitmap,
    #[serde(flatten)]
    pub transform: Transform,
}

impl ImageLayer {
    /// A new, unpositioned image layer with a `width` x `height` box.
    pub fn new(image_data: Bitmap, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_data,
            transform: Transform::new(width, height),
        }
    }
}

impl Layer for ImageLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Image
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

/// A styled text overlay.
///
/// `font_size` tracks `original_font_size * transform.scale`, the same way the
/// box size tracks the original box size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub id: LayerId,
    pub text: String,
    pub color_components: ColorComponents,
    pub font_name: String,
    pub font_size: f64,
    #[serde(flatten)]
    pub transform: Transform,
    pub original_font_size: f64,
}

impl TextLayer {
    pub fn new(
        text: impl Into<String>,
        color: ColorComponents,
        font_name: impl Into<String>,
        font_size: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            color_components: color,
            font_name: font_name.into(),
            font_size,
            transform: Transform::new(width, height),
            original_font_size: font_size,
        }
    }
}

impl Layer for TextLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Text
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn scale_content(&mut self, factor: f64) {
        self.font_size = self.original_font_size * factor;
    }

    fn commit_content_scale(&mut self) {
        self.original_font_size = self.font_size;
    }
}
