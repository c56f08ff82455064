//! Painting requests handed to the data stream.
//!
//! Layout code describes what to draw with short-lived value structs:
//! a line, a border edge, a rectangle, a run of text or a vector shape.
//! The painters and the data stream consume them immediately.
//!
//! ## Example
//!
//! ```
//! use afp_oxide::elements::{BorderPaintingInfo, BorderStyle, Color};
//!
//! let border = BorderPaintingInfo::new(0.0, 0.0, 90.0, 9.0, true, BorderStyle::Double)
//!     .with_color(Color::black());
//! assert!(border.is_horizontal);
//! ```

mod line;
mod path;
mod text;

pub use line::{BorderPaintingInfo, BorderStyle, LineDataInfo, RectanglePaintingInfo};
pub use path::{PathSegment, Shape};
pub use text::TextDataInfo;

/// RGB color with components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel (0.0 - 1.0)
    pub r: f32,
    /// Green channel (0.0 - 1.0)
    pub g: f32,
    /// Blue channel (0.0 - 1.0)
    pub b: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl Color {
    /// Create a new color.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from 8-bit components.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Create a black color.
    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Create a white color.
    pub fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Lighten (positive factor) or darken (negative factor) the color.
    ///
    /// # Examples
    ///
    /// ```
    /// use afp_oxide::elements::Color;
    ///
    /// let grey = Color::new(0.5, 0.5, 0.5);
    /// assert!((grey.lighten(0.4).r - 0.7).abs() < 1e-6);
    /// assert!((grey.lighten(-0.4).r - 0.3).abs() < 1e-6);
    /// ```
    pub fn lighten(&self, factor: f32) -> Color {
        let adjust = |c: f32| {
            if factor > 0.0 {
                c + (1.0 - c) * factor
            } else {
                c - c * -factor
            }
        };
        Color::new(adjust(self.r), adjust(self.g), adjust(self.b))
    }

    /// Components as bytes.
    pub fn to_rgb_bytes(&self) -> [u8; 3] {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_byte(self.r), to_byte(self.g), to_byte(self.b)]
    }

    /// Perceived luminance in 0.0 - 1.0.
    pub fn luminance(&self) -> f32 {
        0.3 * self.r + 0.59 * self.g + 0.11 * self.b
    }
}
