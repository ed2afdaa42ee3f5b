//! One meme being edited.

use mememaker_common::config::EditorDefaults;
use mememaker_common::error::{MemeError, MemeResult};
use mememaker_gesture::mapper::{GestureEvent, GestureMapper, InteractionState};
use mememaker_gesture::preview::{draw_list, hit_test, DrawItem};
use mememaker_meme_model::color::ColorComponents;
use mememaker_meme_model::geometry::CanvasSize;
use mememaker_meme_model::layer::LayerId;
use mememaker_meme_model::meme::Meme;
use mememaker_meme_model::source::ImageSource;
use mememaker_render_engine::export::{ProgressCallback, RenderService};

/// Exclusive owner of a meme while it is on screen.
///
/// Gestures mutate layers in place on the caller's thread; only saving goes
/// through the render service.
#[derive(Debug)]
pub struct EditorSession {
    meme: Meme,
    canvas: CanvasSize,
    defaults: EditorDefaults,
    gestures: GestureMapper,
}

impl EditorSession {
    /// A blank session with no background and no title.
    pub fn new(defaults: EditorDefaults) -> Self {
        Self::open(Meme::new(""), defaults)
    }

    /// Edit an existing meme. Layers that were never positioned are centered.
    pub fn open(mut meme: Meme, defaults: EditorDefaults) -> Self {
        let canvas = CanvasSize::new(defaults.canvas_width, defaults.canvas_height);
        let gestures = GestureMapper::new();
        for id in meme.layer_ids() {
            if let Some(layer) = meme.layer_mut(id) {
                gestures.ensure_positioned(layer, canvas);
            }
        }
        Self {
            meme,
            canvas,
            defaults,
            gestures,
        }
    }

    pub fn meme(&self) -> &Meme {
        &self.meme
    }

    /// End the session and hand the meme back.
    pub fn into_meme(self) -> Meme {
        self.meme
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// The preview canvas was resized. Existing transforms keep their canvas
    /// units.
    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    pub fn defaults(&self) -> &EditorDefaults {
        &self.defaults
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.meme.set_title(title);
    }

    pub fn load_background(&mut self, bytes: &[u8]) -> MemeResult<()> {
        self.meme.set_base_image(bytes)
    }

    pub fn add_overlay_image(&mut self, bytes: &[u8]) -> MemeResult<LayerId> {
        self.meme.add_image_layer(bytes, self.canvas, &self.defaults)
    }

    /// Add a text layer. `color` defaults to the configured text color.
    pub fn add_text(
        &mut self,
        text: impl Into<String>,
        color: Option<ColorComponents>,
        font_name: impl Into<String>,
    ) -> MemeResult<LayerId> {
        let color = color.unwrap_or_else(|| self.default_text_color());
        self.meme
            .add_text_layer(text, color, font_name, self.canvas, &self.defaults)
    }

    /// Use the picked image as the background. Returns false when nothing
    /// was picked.
    pub fn pick_background(&mut self, source: &mut dyn ImageSource) -> MemeResult<bool> {
        match source.pick()? {
            Some(bytes) => {
                self.load_background(&bytes)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Add the picked image as an overlay. `None` when nothing was picked.
    pub fn pick_overlay(&mut self, source: &mut dyn ImageSource) -> MemeResult<Option<LayerId>> {
        match source.pick()? {
            Some(bytes) => self.add_overlay_image(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Route one gesture event to a layer.
    pub fn gesture(&mut self, layer: LayerId, event: GestureEvent) -> MemeResult<InteractionState> {
        let target = self
            .meme
            .layer_mut(layer)
            .ok_or_else(|| MemeError::layer_not_found(layer))?;
        self.gestures.apply(target, event)
    }

    pub fn remove_layer(&mut self, layer: LayerId) -> MemeResult<()> {
        self.meme.remove_layer(layer)?;
        self.gestures.forget(layer);
        Ok(())
    }

    /// What the preview should draw this frame.
    pub fn frame(&self) -> Vec<DrawItem<'_>> {
        draw_list(&self.meme, &self.gestures)
    }

    /// The topmost layer under a canvas point.
    pub fn layer_at(&self, x: f64, y: f64) -> Option<LayerId> {
        hit_test(&self.meme, x, y)
    }

    /// Drop the background, every layer, and the title.
    pub fn clear(&mut self) {
        self.meme.remove_all();
        self.meme.set_title("");
        self.gestures = GestureMapper::new();
        tracing::debug!(meme = %self.meme.id(), "Editor cleared");
    }

    /// Flatten and finalize the meme. On success the session continues with
    /// the saved record; on failure nothing changes.
    pub async fn save(
        &mut self,
        service: &RenderService,
        progress: Option<ProgressCallback>,
    ) -> MemeResult<Meme> {
        if !self.gestures.is_idle() {
            tracing::warn!(meme = %self.meme.id(), "Saving while a gesture is in progress");
        }
        let record = service.save(&self.meme, self.canvas, progress).await?;
        self.meme = record.clone();
        Ok(record)
    }

    fn default_text_color(&self) -> ColorComponents {
        ColorComponents::from_hex(&self.defaults.text_color).unwrap_or_else(|| {
            tracing::warn!(
                color = %self.defaults.text_color,
                "Invalid default text color, using black"
            );
            ColorComponents::BLACK
        })
    }
}
