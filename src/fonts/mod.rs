//! Font reading, encodings and subsetting.
//!
//! This module provides the TrueType reader, the subsetter that produces
//! embeddable font programs, and the character encodings the AFP writer
//! needs (WinAnsi for single-byte metrics, EBCDIC for names and text).

pub mod encoding;
pub mod file_reader;
pub mod font_subsetter;
pub mod truetype;

pub use encoding::TextEncoding;
pub use file_reader::FontFileReader;
pub use font_subsetter::{composite_closure, subset_font, FontSubsetter, GlyphIndexMap};
pub use truetype::{read_font, TrueTypeFont};

/// Metrics a layout or text writer needs from a font.
pub trait FontMetricsProvider {
    /// Design units per em.
    fn units_per_em(&self) -> u16;

    /// Glyph index for a character, `None` when the font cannot render it.
    fn glyph_index(&self, ch: char) -> Option<u16>;

    /// Advance width of a glyph in font units.
    fn advance_width(&self, glyph: u16) -> u16;

    /// Kerning adjustment between two characters in font units.
    fn kerning(&self, left: char, right: char) -> i16;

    /// Width of a string in font units, kerning included.
    ///
    /// Characters without a glyph contribute the width of glyph 0.
    fn text_width(&self, text: &str) -> i32 {
        let mut width = 0i32;
        let mut previous = None;
        for ch in text.chars() {
            let glyph = self.glyph_index(ch).unwrap_or(0);
            width += self.advance_width(glyph) as i32;
            if let Some(prev) = previous {
                width += self.kerning(prev, ch) as i32;
            }
            previous = Some(ch);
        }
        width
    }
}
