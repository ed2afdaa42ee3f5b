//! Meme compositor: flattens a base image and its overlays into one bitmap.
//!
//! Layer geometry lives in preview-canvas units. The base image defines the
//! output size, so every layer is scaled per axis by
//! `base_size / max(canvas_size, 1)` before it is painted.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::point::Point;

use mememaker_common::error::{MemeError, MemeResult};
use mememaker_meme_model::bitmap::Bitmap;
use mememaker_meme_model::geometry::{CanvasSize, Transform};
use mememaker_meme_model::layer::TextLayer;
use mememaker_meme_model::meme::{Flattener, Meme};

use crate::fonts::FontCatalog;
use crate::raster::{paint_rotated, Placement};
use crate::text::render_text_region;

/// Largest font size, in output pixels, rasterized at full density.
const MAX_GLYPH_PX: f64 = 2048.0;

/// Maps canvas units onto output pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputMapping {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl OutputMapping {
    pub fn new(output_width: u32, output_height: u32, canvas: CanvasSize) -> Self {
        let canvas = canvas.at_least_one();
        Self {
            scale_x: output_width as f64 / canvas.width,
            scale_y: output_height as f64 / canvas.height,
        }
    }

    /// Where a layer's live box lands in output pixels.
    pub fn place(&self, transform: &Transform) -> Placement {
        let width = transform.width * self.scale_x;
        let height = transform.height * self.scale_y;
        Placement {
            center_x: transform.offset.width * self.scale_x + width / 2.0,
            center_y: transform.offset.height * self.scale_y + height / 2.0,
            width,
            height,
            rotation_degrees: transform.rotation_degrees,
        }
    }

    /// Font sizes follow the horizontal scale only.
    pub fn font_size(&self, font_size: f64) -> f64 {
        font_size * self.scale_x
    }
}

/// Flattens memes. Holds the font catalog so fonts load once per process.
#[derive(Debug)]
pub struct Compositor {
    fonts: FontCatalog,
}

impl Compositor {
    pub fn new(fonts: FontCatalog) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontCatalog {
        &self.fonts
    }

    /// Composite `meme` at the base image's pixel size.
    pub fn composite(&self, meme: &Meme, canvas: CanvasSize) -> MemeResult<RgbaImage> {
        self.composite_with_progress(meme, canvas, &mut |_, _| {})
    }

    /// Like [`Compositor::composite`], calling `on_layer(done, total)` after
    /// each overlay is painted.
    pub fn composite_with_progress(
        &self,
        meme: &Meme,
        canvas: CanvasSize,
        on_layer: &mut dyn FnMut(usize, usize),
    ) -> MemeResult<RgbaImage> {
        let base = meme.base_image().ok_or(MemeError::MissingBaseImage)?;
        let mut output = base.decode()?.to_rgba8();
        let mapping = OutputMapping::new(output.width(), output.height(), canvas);
        let total = meme.layer_count();
        let mut done = 0;

        for layer in meme.image_layers() {
            let tile = layer.image_data.decode()?.to_rgba8();
            paint_rotated(&mut output, &tile, mapping.place(&layer.transform));
            done += 1;
            on_layer(done, total);
        }

        for layer in meme.text_layers() {
            self.paint_text(&mut output, layer, &mapping)?;
            done += 1;
            on_layer(done, total);
        }

        tracing::debug!(
            meme = %meme.id(),
            width = output.width(),
            height = output.height(),
            layers = total,
            "Composited meme"
        );
        Ok(output)
    }

    fn paint_text(
        &self,
        output: &mut RgbaImage,
        layer: &TextLayer,
        mapping: &OutputMapping,
    ) -> MemeResult<()> {
        if layer.text.trim().is_empty() {
            return Ok(());
        }
        let placement = mapping.place(&layer.transform);
        if !(placement.width >= 1.0 && placement.height >= 1.0) {
            return Ok(());
        }

        let font = self.fonts.resolve(&layer.font_name)?;

        // fonts above MAX_GLYPH_PX are rasterized at reduced density and
        // stretched back up
        let font_px = mapping.font_size(layer.font_size);
        let density = if font_px > MAX_GLYPH_PX {
            MAX_GLYPH_PX / font_px
        } else {
            1.0
        };
        let tile_w = (placement.width * density).round().max(1.0) as u32;
        let tile_h = (placement.height * density).round().max(1.0) as u32;
        let Some(region) = placement.visible_region(tile_w, tile_h, output.width(), output.height())
        else {
            return Ok(());
        };

        let tile = render_text_region(
            &font,
            &layer.text,
            font_px * density,
            layer.color_components.to_rgba8(),
            (tile_w, tile_h),
            region,
        );
        paint_rotated(output, &tile, placement.sub_region(region, tile_w, tile_h));
        Ok(())
    }
}

impl Flattener for Compositor {
    fn flatten(&self, meme: &Meme, canvas: CanvasSize) -> MemeResult<Bitmap> {
        let image = self.composite(meme, canvas)?;
        Bitmap::from_image(&DynamicImage::ImageRgba8(image))
    }
}

/// Outline every layer's rotated box on an already composited image.
pub fn draw_layer_guides(image: &mut RgbaImage, meme: &Meme, canvas: CanvasSize, color: Rgba<u8>) {
    let mapping = OutputMapping::new(image.width(), image.height(), canvas);
    for layer in meme.layers() {
        let t = layer.transform();
        if !(t.width > 0.0 && t.height > 0.0) {
            continue;
        }
        let corners: Vec<Point<f32>> = t
            .corners()
            .iter()
            .map(|&(x, y)| Point::new((x * mapping.scale_x) as f32, (y * mapping.scale_y) as f32))
            .collect();
        imageproc::drawing::draw_hollow_polygon_mut(image, &corners, color);
    }
}
