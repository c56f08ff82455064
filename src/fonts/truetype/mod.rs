//! TrueType/OpenType font reader.
//!
//! [`read_font`] parses an sfnt (or one member of a TrueType Collection) into
//! a [`TrueTypeFont`]: global metrics, per-glyph metrics, the unicode map and
//! kerning. The raw file bytes are kept so the font can later be subset.
//!
//! # Example
//!
//! ```no_run
//! use afp_oxide::fonts::truetype::read_font;
//!
//! let data = std::fs::read("DejaVuSans.ttf")?;
//! let font = read_font(data, None)?;
//! println!("{} has {} glyphs", font.postscript_name(), font.num_glyphs());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cmap;
pub mod directory;
pub mod glyph_names;
pub mod kerning;
pub mod tables;

pub use cmap::{CMapSegment, CharacterMap};
pub use directory::{DirectoryEntry, FontFlavor, TableDirectory};
pub use kerning::KerningTable;

use crate::error::{Error, Result};
use crate::fonts::encoding::winansi_to_unicode;
use crate::fonts::file_reader::FontFileReader;
use crate::fonts::FontMetricsProvider;
use std::collections::BTreeSet;

/// Metrics of one glyph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphMetrics {
    /// Advance width in font units
    pub advance_width: u16,
    /// Left side bearing in font units
    pub left_side_bearing: i16,
    /// Bounding box (xMin, yMin, xMax, yMax)
    pub bbox: [i16; 4],
    /// PostScript name from the `post` table
    pub name: Option<String>,
}

/// In-memory model of a TrueType font.
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    data: Vec<u8>,
    directory: TableDirectory,
    units_per_em: u16,
    font_bbox: [i16; 4],
    mac_style: u16,
    index_to_loc_format: i16,
    num_glyphs: u16,
    metrics: Vec<GlyphMetrics>,
    loca: Vec<u32>,
    hhea_ascender: i16,
    hhea_descender: i16,
    os2_ascender: i16,
    os2_descender: i16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    x_height: i16,
    has_serifs: bool,
    weight_class: u16,
    embeddable: bool,
    italic_angle: f32,
    underline_position: i16,
    underline_thickness: i16,
    is_fixed_pitch: bool,
    notice: String,
    family_names: BTreeSet<String>,
    subfamily_name: String,
    full_name: String,
    postscript_name: String,
    cmap: CharacterMap,
    kerning: KerningTable,
    ansi_widths: [u16; 256],
}

/// Read a font from a complete font file.
///
/// For a TrueType Collection `subfont_name` selects the member whose full
/// name matches exactly; it is ignored for plain sfnt files.
pub fn read_font(data: Vec<u8>, subfont_name: Option<&str>) -> Result<TrueTypeFont> {
    let mut reader = FontFileReader::new(data);
    if reader.len() < 12 {
        return Err(Error::MalformedFont(format!(
            "{} bytes is too short for an sfnt header",
            reader.len()
        )));
    }

    if reader.read_u32_at(0)?.to_be_bytes() == *directory::TTC_TAG {
        reader.seek_set(4)?;
        let offsets = directory::read_collection_offsets(&mut reader)?;
        let directory = select_collection_member(&mut reader, &offsets, subfont_name)?;
        return TrueTypeFont::read_tables(reader, directory);
    }

    let directory = TableDirectory::read(&mut reader)?;
    TrueTypeFont::read_tables(reader, directory)
}

fn select_collection_member(
    reader: &mut FontFileReader,
    offsets: &[u32],
    subfont_name: Option<&str>,
) -> Result<TableDirectory> {
    let mut available = Vec::with_capacity(offsets.len());
    for &offset in offsets {
        reader.seek_set(offset as usize)?;
        let directory = TableDirectory::read(reader)?;
        let full_name = match directory.get(b"name") {
            Some(entry) => tables::read_name(reader, entry)?.full_name,
            None => String::new(),
        };
        log::debug!("TrueType collection member: {}", full_name);
        if subfont_name == Some(full_name.as_str()) {
            return Ok(directory);
        }
        available.push(full_name);
    }

    match subfont_name {
        Some(name) => Err(Error::InvalidArgument(format!(
            "font '{}' not found in collection (available: {})",
            name,
            available.join(", ")
        ))),
        None => Err(Error::InvalidArgument(format!(
            "a font name is required for a TrueType collection (available: {})",
            available.join(", ")
        ))),
    }
}

fn required<'a>(directory: &'a TableDirectory, tag: &[u8; 4]) -> Result<&'a DirectoryEntry> {
    directory.get(tag).ok_or_else(|| {
        Error::MalformedFont(format!(
            "{} table not found",
            tag.iter().map(|&b| b as char).collect::<String>()
        ))
    })
}

impl TrueTypeFont {
    fn read_tables(mut reader: FontFileReader, directory: TableDirectory) -> Result<Self> {
        let head = tables::read_head(&mut reader, required(&directory, b"head")?)?;
        let num_glyphs = tables::read_maxp(&mut reader, required(&directory, b"maxp")?)?;
        let hhea = tables::read_hhea(&mut reader, required(&directory, b"hhea")?)?;
        let hmtx = tables::read_hmtx(
            &mut reader,
            required(&directory, b"hmtx")?,
            hhea.number_of_hmetrics,
            num_glyphs,
        )?;

        let mut metrics: Vec<GlyphMetrics> = hmtx
            .iter()
            .map(|m| GlyphMetrics {
                advance_width: m.advance_width,
                left_side_bearing: m.left_side_bearing,
                ..Default::default()
            })
            .collect();
        let glyph_slots = metrics.len();

        let post = match directory.get(b"post") {
            Some(entry) => tables::read_post(&mut reader, entry, glyph_slots)?,
            None => {
                log::debug!("post table not present");
                tables::PostTable::default()
            },
        };
        for (metric, name) in metrics.iter_mut().zip(post.glyph_names.iter()) {
            metric.name = name.clone();
        }

        let os2 = match directory.get(b"OS/2") {
            Some(entry) => Some(tables::read_os2(&mut reader, entry)?),
            None => {
                log::debug!("OS/2 table not present");
                None
            },
        };

        let mut loca = Vec::new();
        if directory.flavor == FontFlavor::TrueType {
            let loca_entry = required(&directory, b"loca")?;
            let glyf_entry = required(&directory, b"glyf")?;
            loca = tables::read_loca(
                &mut reader,
                loca_entry,
                head.index_to_loc_format,
                num_glyphs as usize,
            )?;
            let bboxes = tables::read_glyph_bboxes(&mut reader, glyf_entry, &loca)?;
            for (metric, bbox) in metrics.iter_mut().zip(bboxes) {
                metric.bbox = bbox;
            }
        } else {
            log::debug!("CFF outlines: glyf/loca not read");
        }

        let names = match directory.get(b"name") {
            Some(entry) => tables::read_name(&mut reader, entry)?,
            None => {
                log::debug!("name table not present");
                tables::NameTable::default()
            },
        };

        let mut font = Self {
            data: Vec::new(),
            units_per_em: head.units_per_em,
            font_bbox: head.bbox,
            mac_style: head.mac_style,
            index_to_loc_format: head.index_to_loc_format,
            num_glyphs,
            metrics,
            loca,
            hhea_ascender: hhea.ascender,
            hhea_descender: hhea.descender,
            os2_ascender: os2.map(|t| t.typo_ascender).unwrap_or(0),
            os2_descender: os2.map(|t| t.typo_descender).unwrap_or(0),
            ascender: 0,
            descender: 0,
            cap_height: os2.and_then(|t| t.cap_height).unwrap_or(0),
            x_height: os2.and_then(|t| t.x_height).unwrap_or(0),
            has_serifs: true,
            weight_class: os2.map(|t| t.weight_class).unwrap_or(400),
            embeddable: os2.map(|t| t.embeddable).unwrap_or(true),
            italic_angle: post.italic_angle,
            underline_position: post.underline_position,
            underline_thickness: post.underline_thickness,
            is_fixed_pitch: post.is_fixed_pitch,
            notice: names.notice,
            family_names: names.family_names,
            subfamily_name: names.subfamily_name,
            full_name: names.full_name,
            postscript_name: names.postscript_name,
            cmap: CharacterMap::new(),
            kerning: KerningTable::default(),
            ansi_widths: [0; 256],
            directory,
        };

        if let Some(entry) = font.directory.get(b"PCLT").copied() {
            let pclt = tables::read_pclt(&mut reader, &entry)?;
            font.x_height = pclt.x_height;
            font.cap_height = pclt.cap_height;
            font.has_serifs = pclt.has_serifs;
        }

        font.determine_ascender_descender();

        let cmap_entry = *required(&font.directory, b"cmap")?;
        font.cmap = cmap::read_cmap(&mut reader, &cmap_entry, glyph_slots)?;

        font.guess_vertical_metrics_from_glyph_bbox();
        font.build_ansi_widths();

        if let Some(entry) = font.directory.get(b"kern").copied() {
            font.kerning = kerning::read_kern(&mut reader, &entry, &font.cmap)?;
        }

        font.data = reader.into_bytes();
        log::debug!(
            "Read font '{}': {} glyphs, unitsPerEm {}",
            font.postscript_name,
            font.num_glyphs,
            font.units_per_em
        );
        Ok(font)
    }

    fn determine_ascender_descender(&mut self) {
        let upem = self.units_per_em as i32;
        let hhea_box = self.hhea_ascender as i32 - self.hhea_descender as i32;
        let os2_box = self.os2_ascender as i32 - self.os2_descender as i32;

        let (ascender, descender) = if self.os2_ascender > 0 && os2_box <= upem {
            (self.os2_ascender, self.os2_descender)
        } else if self.hhea_ascender > 0 && hhea_box <= upem {
            (self.hhea_ascender, self.hhea_descender)
        } else if self.os2_ascender > 0 {
            (self.os2_ascender, self.os2_descender)
        } else {
            (self.hhea_ascender, self.hhea_descender)
        };
        self.ascender = ascender;
        self.descender = descender;
    }

    fn guess_vertical_metrics_from_glyph_bbox(&mut self) {
        let mut local_cap_height = 0;
        let mut local_x_height = 0;
        let mut local_ascender = 0;
        let mut local_descender = 0;

        for (index, metric) in self.metrics.iter().enumerate() {
            let key = match metric.name.as_deref() {
                Some(name @ ("H" | "x" | "d" | "p")) => name.chars().next(),
                _ => self
                    .cmap
                    .first_unicode(index as u16)
                    .and_then(char::from_u32)
                    .filter(|c| matches!(c, 'H' | 'x' | 'd' | 'p')),
            };
            match key {
                Some('H') => local_cap_height = metric.bbox[3],
                Some('x') => local_x_height = metric.bbox[3],
                Some('d') => local_ascender = metric.bbox[3],
                Some('p') => local_descender = metric.bbox[1],
                _ => {},
            }
        }

        if self.ascender as i32 - self.descender as i32 > self.units_per_em as i32 {
            log::debug!(
                "Ascender/descender ({}/{}) exceed unitsPerEm, using glyph bounding boxes ({}/{})",
                self.ascender,
                self.descender,
                local_ascender,
                local_descender
            );
            self.ascender = local_ascender;
            self.descender = local_descender;
        }

        if self.cap_height == 0 {
            self.cap_height = local_cap_height;
            if self.cap_height == 0 {
                self.cap_height = self.ascender;
                log::warn!(
                    "capHeight could not be determined for '{}', using ascender",
                    self.postscript_name
                );
            }
        }
        if self.x_height == 0 {
            self.x_height = local_x_height;
            if self.x_height == 0 {
                log::warn!("xHeight could not be determined for '{}'", self.postscript_name);
            }
        }
    }

    fn build_ansi_widths(&mut self) {
        let missing_width = self.metrics.first().map(|m| m.advance_width).unwrap_or(0);
        for code in 0..=255u8 {
            let width = winansi_to_unicode(code)
                .and_then(|u| self.cmap.glyph_index(u))
                .and_then(|g| self.metrics.get(g as usize))
                .map(|m| m.advance_width)
                .unwrap_or(missing_width);
            self.ansi_widths[code as usize] = width;
        }
    }

    /// Raw font file bytes (whole collection for TTC members).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Table directory of this font.
    pub fn directory(&self) -> &TableDirectory {
        &self.directory
    }

    /// Outline flavor.
    pub fn flavor(&self) -> FontFlavor {
        self.directory.flavor
    }

    /// Design units per em.
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Number of glyphs from `maxp`.
    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    /// Per-glyph metrics; at least `max(numGlyphs, numberOfHMetrics)` long.
    pub fn glyph_metrics(&self) -> &[GlyphMetrics] {
        &self.metrics
    }

    /// `loca` offsets (`num_glyphs + 1` entries, empty for CFF fonts).
    pub fn loca(&self) -> &[u32] {
        &self.loca
    }

    /// `indexToLocFormat` of the source `head` table.
    pub fn index_to_loc_format(&self) -> i16 {
        self.index_to_loc_format
    }

    /// Font bounding box from `head`.
    pub fn font_bbox(&self) -> [i16; 4] {
        self.font_bbox
    }

    /// Mac style bits from `head`.
    pub fn mac_style(&self) -> u16 {
        self.mac_style
    }

    /// Reconciled ascender.
    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    /// Reconciled descender.
    pub fn descender(&self) -> i16 {
        self.descender
    }

    /// Cap height.
    pub fn cap_height(&self) -> i16 {
        self.cap_height
    }

    /// x height.
    pub fn x_height(&self) -> i16 {
        self.x_height
    }

    /// Serif flag from `PCLT` (true when unknown).
    pub fn has_serifs(&self) -> bool {
        self.has_serifs
    }

    /// OS/2 weight class.
    pub fn weight_class(&self) -> u16 {
        self.weight_class
    }

    /// Whether the licence permits embedding.
    pub fn is_embeddable(&self) -> bool {
        self.embeddable
    }

    /// Italic angle in degrees.
    pub fn italic_angle(&self) -> f32 {
        self.italic_angle
    }

    /// Underline position.
    pub fn underline_position(&self) -> i16 {
        self.underline_position
    }

    /// Underline thickness.
    pub fn underline_thickness(&self) -> i16 {
        self.underline_thickness
    }

    /// Monospaced font.
    pub fn is_fixed_pitch(&self) -> bool {
        self.is_fixed_pitch
    }

    /// Copyright notice.
    pub fn notice(&self) -> &str {
        &self.notice
    }

    /// Family names.
    pub fn family_names(&self) -> &BTreeSet<String> {
        &self.family_names
    }

    /// Subfamily name.
    pub fn subfamily_name(&self) -> &str {
        &self.subfamily_name
    }

    /// Full name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// PostScript name.
    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    /// Unicode / glyph map.
    pub fn cmap(&self) -> &CharacterMap {
        &self.cmap
    }

    /// Compressed cmap ranges.
    pub fn cmap_segments(&self) -> Vec<CMapSegment> {
        self.cmap.segments()
    }

    /// Kerning pairs.
    pub fn kerning_table(&self) -> &KerningTable {
        &self.kerning
    }

    /// Advance widths indexed by WinAnsi code, in font units.
    pub fn ansi_widths(&self) -> &[u16; 256] {
        &self.ansi_widths
    }

    /// Scale a font-unit value to 1/1000 em.
    pub fn to_pdf_units(&self, value: i32) -> i32 {
        if self.units_per_em == 1000 {
            value
        } else {
            (value as f64 * 1000.0 / self.units_per_em as f64).round() as i32
        }
    }
}

impl FontMetricsProvider for TrueTypeFont {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn glyph_index(&self, ch: char) -> Option<u16> {
        self.cmap.glyph_index(ch as u32)
    }

    fn advance_width(&self, glyph: u16) -> u16 {
        self.metrics
            .get(glyph as usize)
            .map(|m| m.advance_width)
            .unwrap_or(0)
    }

    fn kerning(&self, left: char, right: char) -> i16 {
        self.kerning.unicode_kerning(left as u32, right as u32)
    }
}
