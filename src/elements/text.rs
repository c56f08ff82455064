//! Text painting request.

use super::Color;
use crate::fonts::TextEncoding;

/// A run of text at one position, in device units.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDataInfo {
    /// Local font identifier from the page's Map Coded Font
    pub font_reference: u8,
    /// Inline start
    pub x: i32,
    /// Baseline
    pub y: i32,
    /// Text color
    pub color: Color,
    /// Increment applied to every variable space character
    pub variable_space_increment: i32,
    /// Inter-character adjustment
    pub inter_character_adjustment: i32,
    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: i32,
    /// The text
    pub text: String,
    /// Encoding of the active code page
    pub encoding: TextEncoding,
}

impl TextDataInfo {
    /// Black text with no spacing adjustments.
    pub fn new(font_reference: u8, x: i32, y: i32, text: impl Into<String>) -> Self {
        Self {
            font_reference,
            x,
            y,
            color: Color::black(),
            variable_space_increment: 0,
            inter_character_adjustment: 0,
            rotation: 0,
            text: text.into(),
            encoding: TextEncoding::default(),
        }
    }

    /// Set the color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the encoding.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set word and letter spacing.
    pub fn with_spacing(mut self, variable_space_increment: i32, inter_character: i32) -> Self {
        self.variable_space_increment = variable_space_increment;
        self.inter_character_adjustment = inter_character;
        self
    }

    /// Encoded text bytes.
    pub fn encoded(&self) -> Vec<u8> {
        self.encoding.encode(&self.text)
    }
}
