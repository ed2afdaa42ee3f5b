//! Text colors stored as unit-range components.

use serde::{Deserialize, Serialize};

/// An RGBA color with every component in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorComponents {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub opacity: f64,
}

impl ColorComponents {
    pub const BLACK: ColorComponents = ColorComponents {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
        opacity: 1.0,
    };

    pub const WHITE: ColorComponents = ColorComponents {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
        opacity: 1.0,
    };

    /// Build a color, clamping each component into range. NaN becomes 0.
    pub fn new(red: f64, green: f64, blue: f64, opacity: f64) -> Self {
        Self {
            red: unit(red),
            green: unit(green),
            blue: unit(blue),
            opacity: unit(opacity),
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !matches!(digits.len(), 6 | 8) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Some(Self::from_rgba8([channel(0)?, channel(2)?, channel(4)?, alpha]))
    }

    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self {
            red: rgba[0] as f64 / 255.0,
            green: rgba[1] as f64 / 255.0,
            blue: rgba[2] as f64 / 255.0,
            opacity: rgba[3] as f64 / 255.0,
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let byte = |v: f64| (unit(v) * 255.0).round() as u8;
        [
            byte(self.red),
            byte(self.green),
            byte(self.blue),
            byte(self.opacity),
        ]
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Default for ColorComponents {
    fn default() -> Self {
        Self::BLACK
    }
}

fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
