//! Pixel-level painting: rotated, stretched blits with source-over blending.
//!
//! All math is plain f64 on one thread, so identical inputs always produce
//! identical pixels.

use image::{Rgba, RgbaImage};

/// Where a source tile lands on the destination, in destination pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise, in degrees, about the center.
    pub rotation_degrees: f64,
}

/// Tile pixels kept around the visible region so bilinear sampling at the
/// output edge never reads a clamped border.
const REGION_MARGIN: f64 = 2.0;

impl Placement {
    fn is_drawable(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.width.is_finite()
            && self.height.is_finite()
            && self.center_x.is_finite()
            && self.center_y.is_finite()
            && self.rotation_degrees.is_finite()
    }

    /// Axis-aligned pixel bounds covered by the rotated box, clipped to a
    /// `dest_w` x `dest_h` image. `None` when nothing is visible.
    fn pixel_bounds(&self, dest_w: u32, dest_h: u32) -> Option<(u32, u32, u32, u32)> {
        let (sin, cos) = self.rotation_degrees.to_radians().sin_cos();
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        let extent_x = (hw * cos).abs() + (hh * sin).abs();
        let extent_y = (hw * sin).abs() + (hh * cos).abs();

        let min_x = (self.center_x - extent_x).floor().max(0.0);
        let min_y = (self.center_y - extent_y).floor().max(0.0);
        let max_x = (self.center_x + extent_x).ceil().min(dest_w as f64);
        let max_y = (self.center_y + extent_y).ceil().min(dest_h as f64);
        if !(min_x < max_x && min_y < max_y) {
            return None;
        }
        Some((min_x as u32, min_y as u32, max_x as u32, max_y as u32))
    }

    /// The part of a `tile_w` x `tile_h` tile stretched into this box that
    /// can land on a `dest_w` x `dest_h` image, as `(x0, y0, x1, y1)` tile
    /// pixels. `None` when nothing is visible.
    ///
    /// A tile only needs to be rasterized over this region, however large
    /// the box is.
    pub fn visible_region(
        &self,
        tile_w: u32,
        tile_h: u32,
        dest_w: u32,
        dest_h: u32,
    ) -> Option<(u32, u32, u32, u32)> {
        if !self.is_drawable() || tile_w == 0 || tile_h == 0 {
            return None;
        }
        let (x0, y0, x1, y1) = self.pixel_bounds(dest_w, dest_h)?;

        let (sin, cos) = self.rotation_degrees.to_radians().sin_cos();
        let (mut min_u, mut min_v) = (f64::INFINITY, f64::INFINITY);
        let (mut max_u, mut max_v) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in [(x0, y0), (x1, y0), (x0, y1), (x1, y1)] {
            let dx = x as f64 - self.center_x;
            let dy = y as f64 - self.center_y;
            let u = dx * cos + dy * sin + self.width / 2.0;
            let v = -dx * sin + dy * cos + self.height / 2.0;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let to_tile_x = tile_w as f64 / self.width;
        let to_tile_y = tile_h as f64 / self.height;
        let rx0 = (min_u * to_tile_x - REGION_MARGIN).floor().max(0.0);
        let ry0 = (min_v * to_tile_y - REGION_MARGIN).floor().max(0.0);
        let rx1 = (max_u * to_tile_x + REGION_MARGIN).ceil().min(tile_w as f64);
        let ry1 = (max_v * to_tile_y + REGION_MARGIN).ceil().min(tile_h as f64);
        if !(rx0 < rx1 && ry0 < ry1) {
            return None;
        }
        Some((rx0 as u32, ry0 as u32, rx1 as u32, ry1 as u32))
    }

    /// Where the `region` of a `tile_w` x `tile_h` tile lands when painted on
    /// its own, so that painting the cropped tile matches painting the whole.
    pub fn sub_region(&self, region: (u32, u32, u32, u32), tile_w: u32, tile_h: u32) -> Placement {
        let (rx0, ry0, rx1, ry1) = region;
        if region == (0, 0, tile_w, tile_h) {
            return *self;
        }

        let per_px_x = self.width / tile_w as f64;
        let per_px_y = self.height / tile_h as f64;
        // region center relative to the box center, unrotated
        let local_x = (rx0 + rx1) as f64 / 2.0 * per_px_x - self.width / 2.0;
        let local_y = (ry0 + ry1) as f64 / 2.0 * per_px_y - self.height / 2.0;
        let (sin, cos) = self.rotation_degrees.to_radians().sin_cos();

        Placement {
            center_x: self.center_x + local_x * cos - local_y * sin,
            center_y: self.center_y + local_x * sin + local_y * cos,
            width: (rx1 - rx0) as f64 * per_px_x,
            height: (ry1 - ry0) as f64 * per_px_y,
            rotation_degrees: self.rotation_degrees,
        }
    }
}

/// Stretch `src` into the placement box, rotate it about the box center, and
/// blend it over `dest`.
///
/// Each destination pixel center is mapped back into the unrotated box and
/// the source is sampled bilinearly there. Pixels whose centers fall outside
/// the box are left alone.
pub fn paint_rotated(dest: &mut RgbaImage, src: &RgbaImage, placement: Placement) {
    let (src_w, src_h) = src.dimensions();
    if !placement.is_drawable() || src_w == 0 || src_h == 0 {
        return;
    }

    let Some((x0, y0, x1, y1)) = placement.pixel_bounds(dest.width(), dest.height()) else {
        return;
    };

    let (sin, cos) = placement.rotation_degrees.to_radians().sin_cos();
    let half_w = placement.width / 2.0;
    let half_h = placement.height / 2.0;
    let to_src_x = src_w as f64 / placement.width;
    let to_src_y = src_h as f64 / placement.height;

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f64 + 0.5 - placement.center_x;
            let dy = y as f64 + 0.5 - placement.center_y;
            let u = dx * cos + dy * sin + half_w;
            let v = -dx * sin + dy * cos + half_h;
            if u < 0.0 || v < 0.0 || u >= placement.width || v >= placement.height {
                continue;
            }

            let sample = sample_bilinear(src, u * to_src_x - 0.5, v * to_src_y - 0.5);
            blend_premultiplied(dest.get_pixel_mut(x, y), sample);
        }
    }
}

/// Blend a straight-alpha color over one pixel.
pub fn blend_pixel(dest: &mut Rgba<u8>, color: [u8; 4], coverage: f32) {
    let alpha = (color[3] as f64 / 255.0) * coverage.clamp(0.0, 1.0) as f64;
    blend_premultiplied(
        dest,
        [
            color[0] as f64 / 255.0 * alpha,
            color[1] as f64 / 255.0 * alpha,
            color[2] as f64 / 255.0 * alpha,
            alpha,
        ],
    );
}

/// Premultiplied RGBA in `[0, 1]`, bilinearly interpolated with edge clamping.
fn sample_bilinear(src: &RgbaImage, sx: f64, sy: f64) -> [f64; 4] {
    let max_x = src.width() as i64 - 1;
    let max_y = src.height() as i64 - 1;
    let fx = sx.floor();
    let fy = sy.floor();
    let tx = sx - fx;
    let ty = sy - fy;
    let x0 = (fx as i64).clamp(0, max_x) as u32;
    let y0 = (fy as i64).clamp(0, max_y) as u32;
    let x1 = (fx as i64 + 1).clamp(0, max_x) as u32;
    let y1 = (fy as i64 + 1).clamp(0, max_y) as u32;

    let corners = [
        (premultiplied(src.get_pixel(x0, y0)), (1.0 - tx) * (1.0 - ty)),
        (premultiplied(src.get_pixel(x1, y0)), tx * (1.0 - ty)),
        (premultiplied(src.get_pixel(x0, y1)), (1.0 - tx) * ty),
        (premultiplied(src.get_pixel(x1, y1)), tx * ty),
    ];

    let mut out = [0.0; 4];
    for (pixel, weight) in corners {
        for (channel, value) in out.iter_mut().zip(pixel) {
            *channel += value * weight;
        }
    }
    out
}

fn premultiplied(pixel: &Rgba<u8>) -> [f64; 4] {
    let a = pixel[3] as f64 / 255.0;
    [
        pixel[0] as f64 / 255.0 * a,
        pixel[1] as f64 / 255.0 * a,
        pixel[2] as f64 / 255.0 * a,
        a,
    ]
}

/// Source-over of a premultiplied source onto a straight-alpha destination.
fn blend_premultiplied(dest: &mut Rgba<u8>, src: [f64; 4]) {
    let src_a = src[3].clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }
    let dest_a = dest[3] as f64 / 255.0;
    let keep = dest_a * (1.0 - src_a);
    let out_a = src_a + keep;

    for i in 0..3 {
        let dest_c = dest[i] as f64 / 255.0;
        let out_c = (src[i] + dest_c * keep) / out_a;
        dest[i] = to_u8(out_c);
    }
    dest[3] = to_u8(out_a);
}

fn to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
