//! Unit conversions between the font backend, the drawing model and the
//! document handle.

use crate::font::OutlinePoint;
use crate::types::{Color, Rgb};

/// Resolution of the document coordinate space, in units per inch.
pub const DPI: i32 = 72;

const C255: f64 = 255.0 / 65535.0;

const ALPHA_MAX: f64 = 0xFFFF as f64;

/// Converts a scaled font coordinate (26.6 fixed point) to pixels.
///
/// Division truncates toward zero and the remainder keeps the sign of the
/// dividend, so negative inputs split as `-1 + -0.5625` rather than
/// `-2 + 0.4375`.
pub fn funits_to_pixels(x: i32) -> f64 {
    let scaled = x << 2;
    (scaled / 256) as f64 + (scaled % 256) as f64 / 256.0
}

/// Maps an outline point to document space. Font Y grows upward and
/// document Y grows downward.
pub fn glyph_point_to_pixel(p: OutlinePoint) -> (f64, f64) {
    (funits_to_pixels(p.x), -funits_to_pixels(p.y))
}

pub fn color_to_channels(c: Color) -> Rgb {
    Rgb {
        r: (c.r as f64 * C255) as u8,
        g: (c.g as f64 * C255) as u8,
        b: (c.b as f64 * C255) as u8,
    }
}

/// Glyph scale (26.6 units per em) for a font size in points at `dpi`.
/// The `/ 3.0` calibrates the 72-unit document space against the font
/// backend's hinting scale.
pub fn glyph_scale(font_size: f64, dpi: i32) -> f64 {
    font_size * dpi as f64 * (64.0 / 72.0) / 3.0
}

/// Alpha of `c` on the 0..=1 scale the document handle caches.
pub fn color_alpha(c: Color) -> f64 {
    c.a as f64 / ALPHA_MAX
}
