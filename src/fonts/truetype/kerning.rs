//! `kern` table decoding.
//!
//! Raw pairs are keyed by glyph index. They are converted to unicode pairs
//! through the cmap and then expanded to WinAnsi pairs for single-byte use.

use super::cmap::CharacterMap;
use super::directory::DirectoryEntry;
use crate::error::Result;
use crate::fonts::encoding::winansi_codes_for;
use crate::fonts::file_reader::FontFileReader;
use bitflags::bitflags;
use std::collections::BTreeMap;

bitflags! {
    /// Low byte of a kern subtable coverage field; the high byte is the format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Coverage: u16 {
        const HORIZONTAL = 0x0001;
        const MINIMUM = 0x0002;
        const CROSS_STREAM = 0x0004;
    }
}

/// Kerning pairs in the three key spaces the font model exposes.
#[derive(Debug, Clone, Default)]
pub struct KerningTable {
    /// (left glyph, right glyph) -> adjustment in font units
    pub glyph_pairs: BTreeMap<(u16, u16), i16>,
    /// (left unicode, right unicode) -> adjustment in font units
    pub unicode_pairs: BTreeMap<(u32, u32), i16>,
    /// (left WinAnsi code, right WinAnsi code) -> adjustment in font units
    pub ansi_pairs: BTreeMap<(u8, u8), i16>,
}

impl KerningTable {
    /// Whether the font carries no usable kerning.
    pub fn is_empty(&self) -> bool {
        self.glyph_pairs.is_empty()
    }

    /// Adjustment between two code points, zero when the pair is not kerned.
    pub fn unicode_kerning(&self, left: u32, right: u32) -> i16 {
        self.unicode_pairs.get(&(left, right)).copied().unwrap_or(0)
    }

    /// Adjustment between two glyphs, zero when the pair is not kerned.
    pub fn glyph_kerning(&self, left: u16, right: u16) -> i16 {
        self.glyph_pairs.get(&(left, right)).copied().unwrap_or(0)
    }
}

/// Read horizontal format 0 subtables of a `kern` table.
///
/// Reading stops at the first subtable that is not plain horizontal kerning
/// (minimum values or cross-stream); other formats are skipped.
pub fn read_kern(
    reader: &mut FontFileReader,
    entry: &DirectoryEntry,
    cmap: &CharacterMap,
) -> Result<KerningTable> {
    reader.seek_set(entry.offset as usize)?;
    // version
    reader.skip(2)?;
    let num_tables = reader.read_u16()?;

    let mut table = KerningTable::default();
    for _ in 0..num_tables {
        let subtable_start = reader.position();
        // subtable version
        reader.skip(2)?;
        let length = reader.read_u16()? as usize;
        let coverage = reader.read_u16()?;
        let flags = Coverage::from_bits_truncate(coverage);
        let format = coverage >> 8;

        if !flags.contains(Coverage::HORIZONTAL)
            || flags.intersects(Coverage::MINIMUM | Coverage::CROSS_STREAM)
        {
            log::debug!("kern subtable coverage {:#06x} ends kerning", coverage);
            break;
        }
        if format != 0 {
            log::debug!("Skipping kern subtable format {}", format);
            reader.seek_set(subtable_start + length)?;
            continue;
        }

        let num_pairs = reader.read_u16()?;
        // searchRange, entrySelector, rangeShift
        reader.skip(6)?;
        for _ in 0..num_pairs {
            let left = reader.read_u16()?;
            let right = reader.read_u16()?;
            let value = reader.read_i16()?;
            if value != 0 {
                table.glyph_pairs.insert((left, right), value);
            }
        }
    }

    for (&(left, right), &value) in &table.glyph_pairs {
        let (Some(left_unicode), Some(right_unicode)) =
            (cmap.first_unicode(left), cmap.first_unicode(right))
        else {
            log::debug!(
                "Ignoring kerning pair ({}, {}): glyph has no unicode mapping",
                left,
                right
            );
            continue;
        };
        table.unicode_pairs.insert((left_unicode, right_unicode), value);
    }

    for (&(left, right), &value) in &table.unicode_pairs {
        for left_code in winansi_codes_for(left) {
            for right_code in winansi_codes_for(right) {
                table.ansi_pairs.insert((left_code, right_code), value);
            }
        }
    }

    log::debug!(
        "kern: {} glyph pairs, {} unicode pairs, {} WinAnsi pairs",
        table.glyph_pairs.len(),
        table.unicode_pairs.len(),
        table.ansi_pairs.len()
    );
    Ok(table)
}
