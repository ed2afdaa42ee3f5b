//! Geometry and transform types for overlay layers.
//!
//! All values are expressed in preview-canvas units. An [`Offset`] is the
//! position of a layer box's top-left corner relative to the canvas origin;
//! the compositor converts canvas units into output pixels.

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A 2D displacement. Field names follow the persisted record format.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal component.
    pub width: f64,
    /// Vertical component.
    pub height: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Exactly zero on both axes. A layer whose committed offset is zero has
    /// never been positioned.
    pub fn is_zero(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset {
            width: self.width + rhs.width,
            height: self.height + rhs.height,
        }
    }
}

/// Size of the on-screen preview canvas that transforms are relative to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Canvas size with each axis held to at least one unit, so it can be
    /// used as a divisor.
    pub fn at_least_one(&self) -> CanvasSize {
        CanvasSize {
            width: self.width.max(1.0),
            height: self.height.max(1.0),
        }
    }
}

/// `committed + translation`. No clamping: layers may leave the canvas.
pub fn apply_drag_delta(committed_offset: Offset, translation: Offset) -> Offset {
    committed_offset + translation
}

/// Live rotation during a twist gesture.
///
/// `angle_since_start` is the absolute angle swept by the current gesture,
/// so the result replaces the previous live value instead of accumulating.
pub fn apply_rotation_delta(base_degrees: f64, angle_since_start: f64) -> f64 {
    normalize_degrees(base_degrees + angle_since_start)
}

/// Live box size during a pinch, always derived from the size captured at
/// gesture start.
pub fn apply_scale_delta(base_width: f64, base_height: f64, scale_factor: f64) -> (f64, f64) {
    (base_width * scale_factor, base_height * scale_factor)
}

/// Offset that centers a box of `layer_width` x `layer_height` on the canvas.
pub fn center_on(canvas: CanvasSize, layer_width: f64, layer_height: f64) -> Offset {
    Offset {
        width: canvas.width / 2.0 - layer_width / 2.0,
        height: canvas.height / 2.0 - layer_height / 2.0,
    }
}

/// Map any angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Position, rotation, and scale of one overlay layer.
///
/// `offset`, `rotation_degrees`, `scale`, `width`, and `height` are the live
/// values the preview draws. `initial_offset`, `original_width`, and
/// `original_height` are the committed values that only change when a gesture
/// ends. At rest `scale == 1.0` and the live size equals the original size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub offset: Offset,
    pub initial_offset: Offset,
    pub scale: f64,
    pub rotation_degrees: f64,
    pub width: f64,
    pub height: f64,
    pub original_width: f64,
    pub original_height: f64,
}

impl Transform {
    /// An unpositioned transform for a box of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            offset: Offset::ZERO,
            initial_offset: Offset::ZERO,
            scale: 1.0,
            rotation_degrees: 0.0,
            width,
            height,
            original_width: width,
            original_height: height,
        }
    }

    /// A transform for a box of the given size, centered on the canvas.
    pub fn centered(canvas: CanvasSize, width: f64, height: f64) -> Self {
        let mut transform = Self::new(width, height);
        transform.center_in(canvas);
        transform
    }

    /// Whether the committed offset has ever been set.
    pub fn is_positioned(&self) -> bool {
        !self.initial_offset.is_zero()
    }

    /// Move to `offset` and commit it.
    pub fn place_at(&mut self, offset: Offset) {
        self.offset = offset;
        self.initial_offset = offset;
    }

    /// Center the current box on the canvas and commit the position.
    pub fn center_in(&mut self, canvas: CanvasSize) {
        self.place_at(center_on(canvas, self.width, self.height));
    }

    /// Center of the live box in canvas units.
    pub fn center(&self) -> (f64, f64) {
        (
            self.offset.width + self.width / 2.0,
            self.offset.height + self.height / 2.0,
        )
    }

    pub fn rotation_radians(&self) -> f64 {
        self.rotation_degrees.to_radians()
    }

    /// Whether no gesture is holding uncommitted values.
    pub fn is_at_rest(&self) -> bool {
        self.offset == self.initial_offset
            && self.scale == 1.0
            && self.width == self.original_width
            && self.height == self.original_height
    }

    /// Corners of the rotated live box in canvas units, clockwise from the
    /// top-left corner of the unrotated box.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (cx, cy) = self.center();
        let (sin, cos) = self.rotation_radians().sin_cos();
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(x, y)| {
            (cx + x * cos - y * sin, cy + x * sin + y * cos)
        })
    }

    /// Hit test a canvas point against the rotated live box.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let (cx, cy) = self.center();
        let (sin, cos) = self.rotation_radians().sin_cos();
        let dx = x - cx;
        let dy = y - cy;
        let local_x = dx * cos + dy * sin;
        let local_y = -dx * sin + dy * cos;
        local_x.abs() <= self.width / 2.0 && local_y.abs() <= self.height / 2.0
    }
}
