//! Paint attributes. Colours are stored as packed `0xAARRGGBB` values so a
//! feature can swap them atomically while the render thread reads them.

use macroquad::prelude::*;

/// Opaque black.
pub const ARGB_BLACK: u32 = 0xFF00_0000;
/// Opaque white.
pub const ARGB_WHITE: u32 = 0xFFFF_FFFF;
/// Opaque blue.
pub const ARGB_BLUE: u32 = 0xFF00_00FF;
/// Opaque cyan.
pub const ARGB_CYAN: u32 = 0xFF00_FFFF;

/// Unpack `0xAARRGGBB`.
#[inline]
pub fn argb_to_color(argb: u32) -> Color {
    let [a, r, g, b] = argb.to_be_bytes();
    Color::from_rgba(r, g, b, a)
}

/// Pack into `0xAARRGGBB`.
#[inline]
pub fn color_to_argb(color: Color) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    u32::from_be_bytes([
        channel(color.a),
        channel(color.r),
        channel(color.g),
        channel(color.b),
    ])
}

/// How a path is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStyle {
    /// Interior.
    Fill,
    /// Outline.
    Stroke,
}

/// Colour and style for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    /// Paint colour.
    pub color: Color,
    /// Fill or stroke.
    pub style: PaintStyle,
    /// Outline width in pixels, unused for fills.
    pub stroke_width: f32,
}

impl Paint {
    /// Fill paint.
    pub fn fill(argb: u32) -> Self {
        Paint {
            color: argb_to_color(argb),
            style: PaintStyle::Fill,
            stroke_width: 0.0,
        }
    }

    /// Stroke paint of `width` pixels.
    pub fn stroke(argb: u32, width: f32) -> Self {
        Paint {
            color: argb_to_color(argb),
            style: PaintStyle::Stroke,
            stroke_width: width,
        }
    }

    /// Same paint in another colour.
    #[inline]
    pub fn with_argb(self, argb: u32) -> Self {
        Paint {
            color: argb_to_color(argb),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_channels_map_to_color() {
        let c = argb_to_color(0x80FF_0000);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(color_to_argb(c), 0x80FF_0000);
        assert_eq!(color_to_argb(argb_to_color(ARGB_CYAN)), ARGB_CYAN);
    }
}
