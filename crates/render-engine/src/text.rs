//! Text tile rasterization: wrap, center, and fill text inside a layer box.

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::raster::blend_pixel;

/// The pixel scale for a font size given in points, treating one point as
/// one output pixel.
pub fn px_scale(font: &FontArc, font_size: f64) -> PxScale {
    let size = font_size.max(0.0) as f32;
    font.pt_to_px_scale(size).unwrap_or(PxScale::from(size))
}

/// Advance width of `line` including kerning.
pub fn line_width(font: &FontArc, scale: PxScale, line: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut prev: Option<GlyphId> = None;
    for ch in line.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Break `text` into lines no wider than `max_width`.
///
/// Hard breaks (`\n`) are kept. Words are wrapped greedily; a single word
/// wider than the box is broken between characters.
pub fn wrap_lines(font: &FontArc, scale: PxScale, text: &str, max_width: f32) -> Vec<String> {
    let fits = |candidate: &str| line_width(font, scale, candidate) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if fits(word) {
                current = word.to_string();
                continue;
            }

            for ch in word.chars() {
                current.push(ch);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Render the `region` of a `box_w` x `box_h` text tile, as `(x0, y0, x1, y1)`
/// tile pixels.
///
/// Lines are wrapped at the full box width, stacked from the top of the box,
/// and centered horizontally, so every region of the same box agrees with
/// every other. Lines and glyphs outside the region are never rasterized.
pub fn render_text_region(
    font: &FontArc,
    text: &str,
    font_size: f64,
    color: [u8; 4],
    (box_w, box_h): (u32, u32),
    region: (u32, u32, u32, u32),
) -> RgbaImage {
    let (rx0, ry0, rx1, ry1) = region;
    let width = rx1.saturating_sub(rx0);
    let height = ry1.saturating_sub(ry0);
    let mut tile = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    if width == 0 || height == 0 || text.is_empty() || font_size <= 0.0 {
        return tile;
    }

    let scale = px_scale(font, font_size);
    let scaled = font.as_scaled(scale);
    let line_height = scaled.height() + scaled.line_gap();
    let lines = wrap_lines(font, scale, text, box_w as f32);
    let (left, top_edge) = (rx0 as f32, ry0 as f32);
    let (right, bottom_edge) = (rx1 as f32, ry1.min(box_h) as f32);

    for (index, line) in lines.iter().enumerate() {
        let top = index as f32 * line_height;
        if top >= bottom_edge {
            break;
        }
        let baseline = top + scaled.ascent();
        let mut x = (box_w as f32 - line_width(font, scale, line)) / 2.0;
        let mut prev: Option<GlyphId> = None;

        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                x += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(x, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let visible = bounds.max.x > left
                    && bounds.min.x < right
                    && bounds.max.y > top_edge
                    && bounds.min.y < bottom_edge;
                if visible {
                    outlined.draw(|gx, gy, coverage| {
                        let px = bounds.min.x as i64 + gx as i64 - rx0 as i64;
                        let py = bounds.min.y as i64 + gy as i64 - ry0 as i64;
                        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                            blend_pixel(tile.get_pixel_mut(px as u32, py as u32), color, coverage);
                        }
                    });
                }
            }
            x += scaled.h_advance(id);
            prev = Some(id);
        }
    }

    tile
}
