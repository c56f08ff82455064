//! Character encodings used by the font reader and the data stream.
//!
//! Three encodings matter here:
//!
//! - **WinAnsi** (Windows-1252): the single-byte encoding used for the
//!   ANSI width and kerning tables built from a TrueType font.
//! - **EBCDIC code page 500**: structured-field names and text for
//!   single-byte AFP code pages.
//! - **UTF-16BE**: double-byte text for Unicode-capable fonts.

use serde::{Deserialize, Serialize};

/// Text encodings understood by the presentation text writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    /// Single-byte EBCDIC (code page 500)
    #[default]
    Cp500,
    /// Double-byte big-endian UTF-16
    Utf16Be,
}

impl TextEncoding {
    /// Encode a string into the bytes emitted in transparent data.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Cp500 => encode_cp500(text),
            TextEncoding::Utf16Be => encode_utf16be(text),
        }
    }

    /// Bytes per character of this encoding.
    pub fn bytes_per_char(&self) -> usize {
        match self {
            TextEncoding::Cp500 => 1,
            TextEncoding::Utf16Be => 2,
        }
    }
}

/// WinAnsi (Windows-1252) encoding table.
///
/// Maps Unicode codepoints to WinAnsi byte values for the range 0x80-0x9F
/// which differs from Latin-1.
pub fn unicode_to_winansi(codepoint: u32) -> Option<u8> {
    // Direct mapping for 0x00-0x7F and 0xA0-0xFF
    if codepoint < 0x80 || (0xA0..=0xFF).contains(&codepoint) {
        return Some(codepoint as u8);
    }

    WINANSI_HIGH
        .iter()
        .position(|&u| u != 0 && u as u32 == codepoint)
        .map(|i| 0x80 + i as u8)
}

/// Unicode value of a WinAnsi byte, `None` for the five undefined codes.
pub fn winansi_to_unicode(code: u8) -> Option<u32> {
    match code {
        0x80..=0x9F => match WINANSI_HIGH[(code - 0x80) as usize] {
            0 => None,
            u => Some(u as u32),
        },
        c => Some(c as u32),
    }
}

/// All WinAnsi codes that render the given Unicode value.
///
/// Besides the direct mapping, 0xA0 is an alternate code for space and
/// 0xAD an alternate code for the hyphen.
pub fn winansi_codes_for(codepoint: u32) -> Vec<u8> {
    let mut codes = Vec::with_capacity(2);
    if let Some(code) = unicode_to_winansi(codepoint) {
        codes.push(code);
    }
    match codepoint {
        0x20 => codes.push(0xA0),
        0x2D => codes.push(0xAD),
        _ => {},
    }
    codes
}

/// Check if a character can be encoded in WinAnsi.
pub fn is_winansi_char(ch: char) -> bool {
    unicode_to_winansi(ch as u32).is_some()
}

// 0x80..=0x9F, zero marks an undefined code
const WINANSI_HIGH: [u16; 32] = [
    0x20AC, 0, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0, 0x017D, 0, 0, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, 0x02DC,
    0x2122, 0x0161, 0x203A, 0x0153, 0, 0x017E, 0x0178,
];

/// EBCDIC substitution character (`?`).
pub const EBCDIC_SUBSTITUTE: u8 = 0x6F;

/// Map one character to code page 500.
///
/// Covers the invariant EBCDIC repertoire (letters, digits, space and the
/// ASCII punctuation); anything else becomes [`EBCDIC_SUBSTITUTE`].
pub fn char_to_cp500(ch: char) -> u8 {
    match ch {
        'a'..='i' => 0x81 + (ch as u8 - b'a'),
        'j'..='r' => 0x91 + (ch as u8 - b'j'),
        's'..='z' => 0xA2 + (ch as u8 - b's'),
        'A'..='I' => 0xC1 + (ch as u8 - b'A'),
        'J'..='R' => 0xD1 + (ch as u8 - b'J'),
        'S'..='Z' => 0xE2 + (ch as u8 - b'S'),
        '0'..='9' => 0xF0 + (ch as u8 - b'0'),
        ' ' => 0x40,
        '[' => 0x4A,
        '.' => 0x4B,
        '<' => 0x4C,
        '(' => 0x4D,
        '+' => 0x4E,
        '!' => 0x4F,
        '&' => 0x50,
        ']' => 0x5A,
        '$' => 0x5B,
        '*' => 0x5C,
        ')' => 0x5D,
        ';' => 0x5E,
        '^' => 0x5F,
        '-' => 0x60,
        '/' => 0x61,
        '|' => 0xBB,
        ',' => 0x6B,
        '%' => 0x6C,
        '_' => 0x6D,
        '>' => 0x6E,
        '?' => 0x6F,
        '`' => 0x79,
        ':' => 0x7A,
        '#' => 0x7B,
        '@' => 0x7C,
        '\'' => 0x7D,
        '=' => 0x7E,
        '"' => 0x7F,
        '~' => 0xA1,
        '{' => 0xC0,
        '}' => 0xD0,
        '\\' => 0xE0,
        _ => EBCDIC_SUBSTITUTE,
    }
}

/// Encode a string in code page 500.
pub fn encode_cp500(text: &str) -> Vec<u8> {
    text.chars().map(char_to_cp500).collect()
}

/// Encode a string as UTF-16BE, surrogate pairs included.
pub fn encode_utf16be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect()
}
