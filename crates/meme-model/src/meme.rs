//! The meme document: a base image plus ordered overlay layers.
//!
//! Paint order is insertion order: the base image, then every image layer,
//! then every text layer. There is no z-index; reordering means removing a
//! layer and adding it again.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mememaker_common::config::EditorDefaults;
use mememaker_common::error::{MemeError, MemeResult};

use crate::bitmap::Bitmap;
use crate::color::ColorComponents;
use crate::geometry::CanvasSize;
use crate::layer::{ImageLayer, Layer, LayerId, TextLayer};

/// Title substituted for a blank one at save time.
pub const UNTITLED: &str = "Untitled";

/// Renders a meme into a single flattened bitmap.
///
/// Implemented by the render engine; the document only needs the result.
pub trait Flattener {
    fn flatten(&self, meme: &Meme, canvas: CanvasSize) -> MemeResult<Bitmap>;
}

/// A meme and everything it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meme {
    id: Uuid,
    title: String,
    #[serde(with = "crate::bitmap::optional_empty")]
    image_data: Option<Bitmap>,
    #[serde(default)]
    overlay_images: Vec<ImageLayer>,
    #[serde(default)]
    overlay_texts: Vec<TextLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    composited_image_data: Option<Bitmap>,
}

impl Meme {
    /// An empty meme without a background.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            image_data: None,
            overlay_images: Vec::new(),
            overlay_texts: Vec::new(),
            composited_image_data: None,
        }
    }

    /// A meme with a background decoded from picker bytes. A blank title is
    /// kept as is until save.
    pub fn create(title: impl Into<String>, base_image: &[u8]) -> MemeResult<Self> {
        let bitmap = Bitmap::from_encoded(base_image)?;
        let mut meme = Self::new(title);
        meme.image_data = Some(bitmap);
        Ok(meme)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn base_image(&self) -> Option<&Bitmap> {
        self.image_data.as_ref()
    }

    pub fn has_base_image(&self) -> bool {
        self.image_data.is_some()
    }

    pub fn image_layers(&self) -> &[ImageLayer] {
        &self.overlay_images
    }

    pub fn text_layers(&self) -> &[TextLayer] {
        &self.overlay_texts
    }

    /// The cached composite from the last save. May be stale.
    pub fn thumbnail(&self) -> Option<&Bitmap> {
        self.composited_image_data.as_ref()
    }

    pub fn layer_count(&self) -> usize {
        self.overlay_images.len() + self.overlay_texts.len()
    }

    /// Every layer id in paint order.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers().map(|layer| layer.id()).collect()
    }

    /// Every layer in paint order.
    pub fn layers(&self) -> impl Iterator<Item = &dyn Layer> {
        self.overlay_images
            .iter()
            .map(|l| l as &dyn Layer)
            .chain(self.overlay_texts.iter().map(|l| l as &dyn Layer))
    }

    pub fn layer(&self, id: LayerId) -> Option<&dyn Layer> {
        self.layers().find(|layer| layer.id() == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut dyn Layer> {
        if let Some(layer) = self.overlay_images.iter_mut().find(|l| l.id == id) {
            return Some(layer);
        }
        self.overlay_texts
            .iter_mut()
            .find(|l| l.id == id)
            .map(|l| l as &mut dyn Layer)
    }

    pub fn image_layer(&self, id: LayerId) -> Option<&ImageLayer> {
        self.overlay_images.iter().find(|l| l.id == id)
    }

    pub fn text_layer(&self, id: LayerId) -> Option<&TextLayer> {
        self.overlay_texts.iter().find(|l| l.id == id)
    }

    /// Decode picker bytes and use them as the background. Existing layers
    /// stay where they are. On failure the meme is unchanged.
    pub fn set_base_image(&mut self, bytes: &[u8]) -> MemeResult<()> {
        let bitmap = Bitmap::from_encoded(bytes)?;
        self.set_base_bitmap(bitmap);
        Ok(())
    }

    /// Use an already validated bitmap as the background.
    pub fn set_base_bitmap(&mut self, bitmap: Bitmap) {
        tracing::debug!(meme = %self.id, bytes = bitmap.len(), "Background set");
        self.image_data = Some(bitmap);
    }

    /// Decode picker bytes into a new image layer, centered on the canvas
    /// and painted above every existing image layer.
    pub fn add_image_layer(
        &mut self,
        bytes: &[u8],
        canvas: CanvasSize,
        defaults: &EditorDefaults,
    ) -> MemeResult<LayerId> {
        self.require_base_image()?;
        let bitmap = Bitmap::from_encoded(bytes)?;
        self.add_image_bitmap(bitmap, canvas, defaults)
    }

    /// Append an already validated bitmap as a new image layer.
    pub fn add_image_bitmap(
        &mut self,
        bitmap: Bitmap,
        canvas: CanvasSize,
        defaults: &EditorDefaults,
    ) -> MemeResult<LayerId> {
        self.require_base_image()?;
        let mut layer = ImageLayer::new(
            bitmap,
            defaults.image_layer_width,
            defaults.image_layer_height,
        );
        layer.transform.center_in(canvas);
        let id = layer.id;
        self.overlay_images.push(layer);
        tracing::debug!(meme = %self.id, layer = %id, "Image layer added");
        Ok(id)
    }

    /// Append a text layer, centered on the canvas and painted above every
    /// existing layer.
    pub fn add_text_layer(
        &mut self,
        text: impl Into<String>,
        color: ColorComponents,
        font_name: impl Into<String>,
        canvas: CanvasSize,
        defaults: &EditorDefaults,
    ) -> MemeResult<LayerId> {
        self.require_base_image()?;
        let mut layer = TextLayer::new(
            text,
            color,
            font_name,
            defaults.font_size,
            defaults.text_layer_width,
            defaults.text_layer_height,
        );
        layer.transform.center_in(canvas);
        let id = layer.id;
        self.overlay_texts.push(layer);
        tracing::debug!(meme = %self.id, layer = %id, "Text layer added");
        Ok(id)
    }

    /// Remove one layer of either kind.
    pub fn remove_layer(&mut self, id: LayerId) -> MemeResult<()> {
        if let Some(index) = self.overlay_images.iter().position(|l| l.id == id) {
            self.overlay_images.remove(index);
            return Ok(());
        }
        if let Some(index) = self.overlay_texts.iter().position(|l| l.id == id) {
            self.overlay_texts.remove(index);
            return Ok(());
        }
        Err(MemeError::layer_not_found(id))
    }

    /// Drop the background, every layer, and the cached thumbnail.
    pub fn remove_all(&mut self) {
        self.image_data = None;
        self.overlay_images.clear();
        self.overlay_texts.clear();
        self.composited_image_data = None;
    }

    /// Build the record to persist: a fresh thumbnail and a non-blank title.
    ///
    /// `self` is never modified, so a failed save leaves the editor state
    /// exactly as it was and the user can retry.
    pub fn prepare_save(&self, canvas: CanvasSize, flattener: &dyn Flattener) -> MemeResult<Meme> {
        self.require_base_image()?;
        let thumbnail = flattener.flatten(self, canvas)?;

        let mut record = self.clone();
        let trimmed = record.title.trim();
        record.title = if trimmed.is_empty() {
            UNTITLED.to_string()
        } else {
            trimmed.to_string()
        };
        record.composited_image_data = Some(thumbnail);
        Ok(record)
    }

    fn require_base_image(&self) -> MemeResult<()> {
        if self.image_data.is_none() {
            return Err(MemeError::MissingBaseImage);
        }
        Ok(())
    }
}
