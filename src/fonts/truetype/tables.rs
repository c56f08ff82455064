//! Readers for the fixed-layout sfnt tables.
//!
//! Each reader seeks to its table, pulls out the fields the font model keeps,
//! and leaves the cursor wherever it stopped. Field offsets are relative to
//! the start of the table.

use super::directory::DirectoryEntry;
use super::glyph_names::{mac_glyph_name, NUM_MAC_GLYPH_NAMES};
use crate::error::{Error, Result};
use crate::fonts::file_reader::FontFileReader;
use std::collections::BTreeSet;

/// Byte offset of `checkSumAdjustment` inside `head`.
pub const HEAD_CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;
/// Byte offset of `indexToLocFormat` inside `head`.
pub const HEAD_INDEX_TO_LOC_FORMAT_OFFSET: usize = 50;
/// Byte offset of `numberOfHMetrics` inside `hhea`.
pub const HHEA_NUMBER_OF_HMETRICS_OFFSET: usize = 34;
/// Byte offset of `numGlyphs` inside `maxp`.
pub const MAXP_NUM_GLYPHS_OFFSET: usize = 4;

/// Fields of the `head` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadTable {
    /// Design units per em
    pub units_per_em: u16,
    /// Font bounding box (xMin, yMin, xMax, yMax)
    pub bbox: [i16; 4],
    /// Mac style bits (bold = 1, italic = 2)
    pub mac_style: u16,
    /// 0 for short `loca` offsets, 1 for long
    pub index_to_loc_format: i16,
}

/// Read the `head` table.
pub fn read_head(reader: &mut FontFileReader, entry: &DirectoryEntry) -> Result<HeadTable> {
    let start = entry.offset as usize;
    reader.seek_set(start + 18)?;
    let units_per_em = reader.read_u16()?;
    if units_per_em == 0 {
        return Err(Error::MalformedFont("head.unitsPerEm is zero".to_string()));
    }

    reader.seek_set(start + 36)?;
    let mut bbox = [0i16; 4];
    for v in bbox.iter_mut() {
        *v = reader.read_i16()?;
    }
    let mac_style = reader.read_u16()?;

    reader.seek_set(start + HEAD_INDEX_TO_LOC_FORMAT_OFFSET)?;
    let index_to_loc_format = reader.read_i16()?;

    Ok(HeadTable {
        units_per_em,
        bbox,
        mac_style,
        index_to_loc_format,
    })
}

/// Read `maxp.numGlyphs`.
pub fn read_maxp(reader: &mut FontFileReader, entry: &DirectoryEntry) -> Result<u16> {
    reader.seek_set(entry.offset as usize + MAXP_NUM_GLYPHS_OFFSET)?;
    reader.read_u16()
}

/// Fields of the `hhea` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct HheaTable {
    /// Typographic ascender
    pub ascender: i16,
    /// Typographic descender (negative below the baseline)
    pub descender: i16,
    /// Number of explicit entries in `hmtx`
    pub number_of_hmetrics: u16,
}

/// Read the `hhea` table.
pub fn read_hhea(reader: &mut FontFileReader, entry: &DirectoryEntry) -> Result<HheaTable> {
    let start = entry.offset as usize;
    reader.seek_set(start + 4)?;
    let ascender = reader.read_i16()?;
    let descender = reader.read_i16()?;
    reader.seek_set(start + HHEA_NUMBER_OF_HMETRICS_OFFSET)?;
    let number_of_hmetrics = reader.read_u16()?;
    Ok(HheaTable {
        ascender,
        descender,
        number_of_hmetrics,
    })
}

/// Horizontal metric of one glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HorizontalMetric {
    /// Advance width in font units
    pub advance_width: u16,
    /// Left side bearing in font units
    pub left_side_bearing: i16,
}

/// Read `hmtx`.
///
/// The result holds `max(num_glyphs, number_of_hmetrics)` entries; glyphs past
/// the explicit metrics inherit the last advance width and read their left
/// side bearing from the trailing array when present.
pub fn read_hmtx(
    reader: &mut FontFileReader,
    entry: &DirectoryEntry,
    number_of_hmetrics: u16,
    num_glyphs: u16,
) -> Result<Vec<HorizontalMetric>> {
    let explicit = number_of_hmetrics as usize;
    let total = explicit.max(num_glyphs as usize);
    let table_end = entry.offset as usize + entry.length as usize;

    reader.seek_set(entry.offset as usize)?;
    let mut metrics = Vec::with_capacity(total);
    for _ in 0..explicit {
        let advance_width = reader.read_u16()?;
        let left_side_bearing = reader.read_i16()?;
        metrics.push(HorizontalMetric {
            advance_width,
            left_side_bearing,
        });
    }

    if total > explicit {
        let last_width = metrics.last().map(|m| m.advance_width).unwrap_or(0);
        log::debug!(
            "{} glyphs share the last advance width {}",
            total - explicit,
            last_width
        );
        for _ in explicit..total {
            let left_side_bearing = if reader.position() + 2 <= table_end {
                reader.read_i16()?
            } else {
                0
            };
            metrics.push(HorizontalMetric {
                advance_width: last_width,
                left_side_bearing,
            });
        }
    }

    Ok(metrics)
}

/// Fields of the `post` table.
#[derive(Debug, Clone, Default)]
pub struct PostTable {
    /// Italic angle in degrees counter-clockwise from vertical
    pub italic_angle: f32,
    /// Underline position (top of the underline)
    pub underline_position: i16,
    /// Underline thickness
    pub underline_thickness: i16,
    /// Monospaced font
    pub is_fixed_pitch: bool,
    /// PostScript glyph names by glyph index (empty when the format has none)
    pub glyph_names: Vec<Option<String>>,
}

/// Read the `post` table; `glyph_slots` bounds the name array.
pub fn read_post(
    reader: &mut FontFileReader,
    entry: &DirectoryEntry,
    glyph_slots: usize,
) -> Result<PostTable> {
    let start = entry.offset as usize;
    reader.seek_set(start)?;
    let format = reader.read_u32()?;
    let italic_angle = reader.read_fixed()?;
    let underline_position = reader.read_i16()?;
    let underline_thickness = reader.read_i16()?;
    let is_fixed_pitch = reader.read_u32()? != 0;

    let mut post = PostTable {
        italic_angle,
        underline_position,
        underline_thickness,
        is_fixed_pitch,
        glyph_names: Vec::new(),
    };

    match format {
        0x0001_0000 => {
            log::debug!("post table format 1.0: standard Macintosh glyph names");
            post.glyph_names = (0..glyph_slots.min(NUM_MAC_GLYPH_NAMES))
                .map(|i| mac_glyph_name(i).map(str::to_string))
                .collect();
        },
        0x0002_0000 => {
            log::debug!("post table format 2.0: per-glyph name indices");
            post.glyph_names = read_post_format2(reader, start + 32, glyph_slots)?;
        },
        0x0002_5000 => {
            log::debug!("post table format 2.5: no PostScript names read");
        },
        0x0003_0000 => {
            log::debug!("post table format 3.0: no PostScript names");
        },
        other => {
            log::debug!("Unknown post table format {:#010x}, ignoring names", other);
        },
    }

    Ok(post)
}

fn read_post_format2(
    reader: &mut FontFileReader,
    offset: usize,
    glyph_slots: usize,
) -> Result<Vec<Option<String>>> {
    reader.seek_set(offset)?;
    let num_glyphs = reader.read_u16()? as usize;
    let mut indices = Vec::with_capacity(num_glyphs);
    for _ in 0..num_glyphs {
        indices.push(reader.read_u16()? as usize);
    }

    let pool_size = indices
        .iter()
        .filter(|&&i| i >= NUM_MAC_GLYPH_NAMES)
        .map(|&i| i - NUM_MAC_GLYPH_NAMES + 1)
        .max()
        .unwrap_or(0);
    let mut pool = Vec::with_capacity(pool_size);
    for _ in 0..pool_size {
        let len = reader.read_u8()? as usize;
        pool.push(reader.read_string(len)?);
    }

    let names = indices
        .iter()
        .take(glyph_slots)
        .map(|&index| {
            if index < NUM_MAC_GLYPH_NAMES {
                mac_glyph_name(index).map(str::to_string)
            } else {
                pool.get(index - NUM_MAC_GLYPH_NAMES).cloned()
            }
        })
        .collect();
    Ok(names)
}

/// Fields of the `OS/2` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Os2Table {
    /// Weight class (400 regular, 700 bold)
    pub weight_class: u16,
    /// False when the licence forbids embedding
    pub embeddable: bool,
    /// Typographic ascender
    pub typo_ascender: i16,
    /// Typographic descender
    pub typo_descender: i16,
    /// x height when the table is long enough to carry it
    pub x_height: Option<i16>,
    /// Cap height when the table is long enough to carry it
    pub cap_height: Option<i16>,
}

/// Read the `OS/2` table.
pub fn read_os2(reader: &mut FontFileReader, entry: &DirectoryEntry) -> Result<Os2Table> {
    let start = entry.offset as usize;
    reader.seek_set(start + 4)?;
    let weight_class = reader.read_u16()?;
    reader.seek_set(start + 8)?;
    let fs_type = reader.read_u16()?;
    // restricted licence embedding
    let embeddable = fs_type & 0x000F != 0x0002;

    reader.seek_set(start + 68)?;
    let typo_ascender = reader.read_i16()?;
    let typo_descender = reader.read_i16()?;

    let (x_height, cap_height) = if entry.length >= 90 {
        reader.seek_set(start + 86)?;
        (Some(reader.read_i16()?), Some(reader.read_i16()?))
    } else {
        (None, None)
    };

    Ok(Os2Table {
        weight_class,
        embeddable,
        typo_ascender,
        typo_descender,
        x_height,
        cap_height,
    })
}

/// Read `loca` as `num_glyphs + 1` byte offsets into `glyf`.
pub fn read_loca(
    reader: &mut FontFileReader,
    entry: &DirectoryEntry,
    index_to_loc_format: i16,
    num_glyphs: usize,
) -> Result<Vec<u32>> {
    reader.seek_set(entry.offset as usize)?;
    let mut offsets = Vec::with_capacity(num_glyphs + 1);
    for _ in 0..=num_glyphs {
        let offset = if index_to_loc_format == 1 {
            reader.read_u32()?
        } else {
            reader.read_u16()? as u32 * 2
        };
        offsets.push(offset);
    }
    if offsets.windows(2).any(|w| w[0] > w[1]) {
        log::debug!("loca offsets are not monotonic");
    }
    Ok(offsets)
}

/// Read each glyph's bounding box from `glyf`.
///
/// Glyphs without outline data (same offset as their successor) receive
/// glyph 0's `xMin` in all four corners.
pub fn read_glyph_bboxes(
    reader: &mut FontFileReader,
    entry: &DirectoryEntry,
    loca: &[u32],
) -> Result<Vec<[i16; 4]>> {
    let glyph_count = loca.len().saturating_sub(1);
    let mut bboxes: Vec<[i16; 4]> = Vec::with_capacity(glyph_count);

    for i in 0..glyph_count {
        if loca[i] != loca[i + 1] {
            if loca[i] >= entry.length {
                return Err(Error::MalformedFont(format!(
                    "glyph {} offset {} lies beyond the glyf table ({} bytes)",
                    i, loca[i], entry.length
                )));
            }
            reader.seek_set(entry.offset as usize + loca[i] as usize)?;
            // numberOfContours
            reader.skip(2)?;
            let mut bbox = [0i16; 4];
            for v in bbox.iter_mut() {
                *v = reader.read_i16()?;
            }
            bboxes.push(bbox);
        } else {
            // glyph 0's xMin copied into every corner; kept as observed
            let bbox0 = bboxes.first().map(|b| b[0]).unwrap_or(0);
            bboxes.push([bbox0; 4]);
        }
    }

    Ok(bboxes)
}

/// Name strings from the `name` table.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    /// Copyright notice (name ID 0)
    pub notice: String,
    /// Family names (IDs 1 and 16)
    pub family_names: BTreeSet<String>,
    /// Subfamily (ID 2)
    pub subfamily_name: String,
    /// Full name (ID 4)
    pub full_name: String,
    /// PostScript name (ID 6)
    pub postscript_name: String,
}

/// Read the `name` table.
///
/// Only Macintosh and Microsoft records with encoding 0 or 1 are used. The
/// first record wins for every field except the full name, which is replaced
/// by a Microsoft US-English record when one exists.
pub fn read_name(reader: &mut FontFileReader, entry: &DirectoryEntry) -> Result<NameTable> {
    let start = entry.offset as usize;
    reader.seek_set(start)?;
    // format
    reader.skip(2)?;
    let count = reader.read_u16()?;
    let string_base = start + reader.read_u16()? as usize;

    let mut names = NameTable::default();
    for i in 0..count as usize {
        reader.seek_set(start + 6 + i * 12)?;
        let platform_id = reader.read_u16()?;
        let encoding_id = reader.read_u16()?;
        let language_id = reader.read_u16()?;
        let name_id = reader.read_u16()?;
        let length = reader.read_u16()? as usize;
        let offset = reader.read_u16()? as usize;

        if !matches!(platform_id, 1 | 3) || !matches!(encoding_id, 0 | 1) {
            continue;
        }

        reader.seek_set(string_base + offset)?;
        let text = if platform_id == 3 {
            reader.read_string_utf16(length)?
        } else {
            reader.read_string(length)?
        };

        match name_id {
            0 if names.notice.is_empty() => names.notice = text,
            1 | 16 => {
                names.family_names.insert(text);
            },
            2 if names.subfamily_name.is_empty() => names.subfamily_name = text,
            4 if names.full_name.is_empty() || (platform_id == 3 && language_id == 1033) => {
                names.full_name = text
            },
            6 if names.postscript_name.is_empty() => names.postscript_name = text,
            _ => {},
        }
    }

    Ok(names)
}

/// Fields of the `PCLT` table.
#[derive(Debug, Clone, Copy)]
pub struct PcltTable {
    /// x height
    pub x_height: i16,
    /// Cap height
    pub cap_height: i16,
    /// False for sans-serif stroke styles
    pub has_serifs: bool,
}

/// Read the `PCLT` table.
pub fn read_pclt(reader: &mut FontFileReader, entry: &DirectoryEntry) -> Result<PcltTable> {
    reader.seek_set(entry.offset as usize + 10)?;
    let x_height = reader.read_i16()?;
    // style, typeFamily
    reader.skip(4)?;
    let cap_height = reader.read_i16()?;
    // symbolSet, typeface, characterComplement, fileName, strokeWeight, widthType
    reader.skip(34)?;
    let serif_style = (reader.read_u8()? >> 6) & 3;
    Ok(PcltTable {
        x_height,
        cap_height,
        has_serifs: serif_style != 1,
    })
}
