//! `cmap` decoding (format 4 segment mapping).
//!
//! Every accepted (code, glyph) pair is recorded in both directions. The
//! unicode-sorted map is what [`CharacterMap::segments`] compresses into
//! contiguous ranges for CID font construction.

use super::directory::DirectoryEntry;
use crate::error::{Error, Result};
use crate::fonts::file_reader::FontFileReader;
use std::collections::BTreeMap;

/// Platform ID for Microsoft encodings.
const PLATFORM_MICROSOFT: u16 = 3;
/// Microsoft symbol encoding.
const ENCODING_SYMBOL: u16 = 0;
/// Microsoft Unicode BMP encoding.
const ENCODING_UNICODE_BMP: u16 = 1;

/// "Not defined" code at the end of every format 4 table.
const NOT_DEFINED: u32 = 0xFFFF;

/// A maximal run of consecutive code points mapped to consecutive glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CMapSegment {
    /// First unicode value of the run
    pub unicode_start: u32,
    /// Last unicode value of the run (inclusive)
    pub unicode_end: u32,
    /// Glyph index of `unicode_start`
    pub glyph_start_index: u16,
}

/// Bidirectional unicode / glyph index map.
#[derive(Debug, Clone, Default)]
pub struct CharacterMap {
    unicode_to_glyph: BTreeMap<u32, u16>,
    glyph_to_unicode: BTreeMap<u16, Vec<u32>>,
}

impl CharacterMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mapping; a code point keeps its first glyph.
    pub fn insert(&mut self, unicode: u32, glyph: u16) {
        if self.unicode_to_glyph.contains_key(&unicode) {
            return;
        }
        self.unicode_to_glyph.insert(unicode, glyph);
        self.glyph_to_unicode.entry(glyph).or_default().push(unicode);
    }

    /// Glyph index mapped to a code point.
    pub fn glyph_index(&self, unicode: u32) -> Option<u16> {
        self.unicode_to_glyph.get(&unicode).copied()
    }

    /// All code points mapped to a glyph, in the order they were read.
    pub fn unicodes_for(&self, glyph: u16) -> &[u32] {
        self.glyph_to_unicode
            .get(&glyph)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First code point mapped to a glyph.
    pub fn first_unicode(&self, glyph: u16) -> Option<u32> {
        self.unicodes_for(glyph).first().copied()
    }

    /// Whether a code point is mapped.
    pub fn contains(&self, unicode: u32) -> bool {
        self.unicode_to_glyph.contains_key(&unicode)
    }

    /// Number of mapped code points.
    pub fn len(&self) -> usize {
        self.unicode_to_glyph.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.unicode_to_glyph.is_empty()
    }

    /// Iterate (unicode, glyph) pairs in unicode order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16)> + '_ {
        self.unicode_to_glyph.iter().map(|(&u, &g)| (u, g))
    }

    /// Compress the mapping into maximal contiguous segments.
    pub fn segments(&self) -> Vec<CMapSegment> {
        let mut segments = Vec::new();
        let mut iter = self.iter();
        let Some((first_unicode, first_glyph)) = iter.next() else {
            return segments;
        };

        let mut current = CMapSegment {
            unicode_start: first_unicode,
            unicode_end: first_unicode,
            glyph_start_index: first_glyph,
        };
        let mut last_glyph = first_glyph as u32;

        for (unicode, glyph) in iter {
            if current.unicode_end + 1 != unicode || last_glyph + 1 != glyph as u32 {
                segments.push(current);
                current = CMapSegment {
                    unicode_start: unicode,
                    unicode_end: unicode,
                    glyph_start_index: glyph,
                };
            } else {
                current.unicode_end = unicode;
            }
            last_glyph = glyph as u32;
        }
        segments.push(current);
        segments
    }
}

/// Read the Unicode (3,1) or Symbol (3,0) subtable of a `cmap` table.
///
/// `glyph_slots` bounds the glyph indices that are accepted; mappings to
/// glyphs beyond it are dropped with a diagnostic.
pub fn read_cmap(
    reader: &mut FontFileReader,
    entry: &DirectoryEntry,
    glyph_slots: usize,
) -> Result<CharacterMap> {
    let table_start = entry.offset as usize;
    reader.seek_set(table_start)?;
    // version
    reader.skip(2)?;
    let num_subtables = reader.read_u16()?;

    let mut unicode_offset = None;
    let mut symbol_offset = None;
    for _ in 0..num_subtables {
        let platform_id = reader.read_u16()?;
        let encoding_id = reader.read_u16()?;
        let offset = reader.read_u32()?;
        log::debug!(
            "cmap subtable platform={} encoding={} offset={}",
            platform_id,
            encoding_id,
            offset
        );
        if platform_id == PLATFORM_MICROSOFT {
            match encoding_id {
                ENCODING_UNICODE_BMP => unicode_offset = Some(offset),
                ENCODING_SYMBOL => symbol_offset = Some(offset),
                _ => {},
            }
        }
    }

    let (offset, encoding_id) = match (unicode_offset, symbol_offset) {
        (Some(offset), _) => (offset, ENCODING_UNICODE_BMP),
        (None, Some(offset)) => (offset, ENCODING_SYMBOL),
        (None, None) => {
            return Err(Error::UnsupportedFontFlavor(
                "no Unicode or Symbol cmap subtable present".to_string(),
            ))
        },
    };

    read_format4(reader, table_start + offset as usize, encoding_id, glyph_slots)
}

fn read_format4(
    reader: &mut FontFileReader,
    subtable_start: usize,
    encoding_id: u16,
    glyph_slots: usize,
) -> Result<CharacterMap> {
    reader.seek_set(subtable_start)?;
    let format = reader.read_u16()?;
    if format != 4 {
        return Err(Error::UnsupportedFontFlavor(format!(
            "cmap format {} not supported",
            format
        )));
    }
    // length, language
    reader.skip(4)?;

    let seg_count = (reader.read_u16()? / 2) as usize;
    // searchRange, entrySelector, rangeShift
    reader.skip(6)?;

    let end_codes = read_u16_array(reader, seg_count)?;
    // reservedPad
    reader.skip(2)?;
    let start_codes = read_u16_array(reader, seg_count)?;
    let mut deltas = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        deltas.push(reader.read_i16()?);
    }
    let range_offsets = read_u16_array(reader, seg_count)?;
    let glyph_id_array_offset = reader.position();

    let mut cmap = CharacterMap::new();
    for i in 0..seg_count {
        let start = start_codes[i] as u32;
        let end = end_codes[i] as u32;
        if start > end {
            log::debug!("Skipping cmap segment {} with start {} > end {}", i, start, end);
            continue;
        }

        for code in start..=end {
            let glyph = if range_offsets[i] != 0 && code != NOT_DEFINED {
                let ptr = (range_offsets[i] / 2) as i64 + (code - start) as i64 + i as i64
                    - seg_count as i64;
                let position = glyph_id_array_offset as i64 + 2 * ptr;
                if position < 0 {
                    log::debug!("cmap glyph id pointer for U+{:04X} is negative", code);
                    continue;
                }
                match reader.read_u16_at(position as usize) {
                    Ok(raw) => ((raw as i32 + deltas[i] as i32) & 0xFFFF) as u16,
                    Err(_) => {
                        log::debug!("cmap glyph id for U+{:04X} lies outside the font", code);
                        continue;
                    },
                }
            } else {
                ((code as i32 + deltas[i] as i32) & 0xFFFF) as u16
            };

            if glyph as usize >= glyph_slots {
                log::debug!("Glyph {} out of range: {}", glyph, glyph_slots);
                continue;
            }

            cmap.insert(code, glyph);

            // Symbol fonts park their glyphs at 0xF020-0xF0FF; expose them
            // in the Latin-1 range too unless that slot is taken.
            if encoding_id == ENCODING_SYMBOL && (0xF020..=0xF0FF).contains(&code) {
                let mapped = code - 0xF000;
                if !cmap.contains(mapped) {
                    cmap.insert(mapped, glyph);
                }
            }
        }
    }

    log::debug!("cmap format 4: {} code points mapped", cmap.len());
    Ok(cmap)
}

fn read_u16_array(reader: &mut FontFileReader, count: usize) -> Result<Vec<u16>> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(reader.read_u16()?);
    }
    Ok(values)
}
