//! TrueType font subsetting for AFP object containers.
//!
//! Embedded fonts only need the glyphs a document actually draws. The
//! subsetter works in three steps:
//!
//! 1. Track used characters and assign them dense subset glyph indices
//!    ([`FontSubsetter`], [`GlyphIndexMap`]).
//! 2. Close the glyph set over composite glyph references
//!    ([`composite_closure`]).
//! 3. Rebuild a standalone sfnt holding only `head`, `hhea`, `hmtx`, `maxp`,
//!    `loca`, `glyf` and, when present, `cvt `, `fpgm` and `prep`
//!    ([`subset_font`]).
//!
//! Subset fonts are named with a 6-letter tag prefix (e.g. "ABCDEF+FontName").

use crate::error::{Error, Result};
use crate::fonts::file_reader::FontFileReader;
use crate::fonts::truetype::directory::{table_checksum, FontFlavor};
use crate::fonts::truetype::tables::{
    HEAD_CHECKSUM_ADJUSTMENT_OFFSET, HEAD_INDEX_TO_LOC_FORMAT_OFFSET,
    HHEA_NUMBER_OF_HMETRICS_OFFSET, MAXP_NUM_GLYPHS_OFFSET,
};
use crate::fonts::truetype::TrueTypeFont;
use crate::fonts::FontMetricsProvider;
use bitflags::bitflags;
use fnv::FnvHasher;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::hash::Hasher;

bitflags! {
    /// Flags of one composite glyph component record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct ComponentFlags: u16 {
        /// Arguments are 16-bit instead of 8-bit
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        /// One F2Dot14 scale follows the arguments
        const WE_HAVE_A_SCALE = 0x0008;
        const MORE_COMPONENTS = 0x0020;
        /// Separate x and y scales follow
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        /// A 2x2 transform follows
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
    }
}

/// Magic constant for `head.checkSumAdjustment`.
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Bidirectional original glyph index / subset glyph index map.
///
/// Subset indices are dense: the n-th distinct glyph inserted receives index n.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphIndexMap {
    to_subset: BTreeMap<u16, u16>,
    to_original: Vec<u16>,
}

impl GlyphIndexMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map holding `.notdef` (glyph 0) at subset index 0.
    pub fn with_notdef() -> Self {
        let mut map = Self::new();
        map.insert(0);
        map
    }

    /// Add a glyph, returning its subset index (existing or newly assigned).
    pub fn insert(&mut self, original: u16) -> u16 {
        if let Some(&subset) = self.to_subset.get(&original) {
            return subset;
        }
        let subset = self.to_original.len() as u16;
        self.to_subset.insert(original, subset);
        self.to_original.push(original);
        subset
    }

    /// Subset index of an original glyph.
    pub fn get(&self, original: u16) -> Option<u16> {
        self.to_subset.get(&original).copied()
    }

    /// Original glyph at a subset index.
    pub fn original(&self, subset: u16) -> Option<u16> {
        self.to_original.get(subset as usize).copied()
    }

    /// Whether an original glyph is mapped.
    pub fn contains(&self, original: u16) -> bool {
        self.to_subset.contains_key(&original)
    }

    /// Number of mapped glyphs.
    pub fn len(&self) -> usize {
        self.to_original.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.to_original.is_empty()
    }

    /// Original glyph indices in subset-index order.
    pub fn originals(&self) -> &[u16] {
        &self.to_original
    }

    /// (original, subset) pairs in original-index order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.to_subset.iter().map(|(&o, &s)| (o, s))
    }
}

/// Tracks the characters a document uses from one font.
#[derive(Debug, Clone)]
pub struct FontSubsetter {
    /// Used Unicode codepoints mapped to their original glyph IDs
    used_chars: BTreeMap<u32, u16>,
    glyphs: GlyphIndexMap,
}

impl Default for FontSubsetter {
    fn default() -> Self {
        Self::new()
    }
}

impl FontSubsetter {
    /// Create a subsetter; `.notdef` is always glyph 0 of the subset.
    pub fn new() -> Self {
        Self {
            used_chars: BTreeMap::new(),
            glyphs: GlyphIndexMap::with_notdef(),
        }
    }

    /// Create a subsetter with an empty glyph map.
    pub fn without_notdef() -> Self {
        Self {
            used_chars: BTreeMap::new(),
            glyphs: GlyphIndexMap::new(),
        }
    }

    /// Record a character as used and return its subset glyph index.
    pub fn use_char(&mut self, codepoint: u32, glyph_id: u16) -> u16 {
        self.used_chars.insert(codepoint, glyph_id);
        self.glyphs.insert(glyph_id)
    }

    /// Record every character of `text`, returning the subset glyph indices
    /// in text order. Characters the font cannot map use `.notdef`.
    pub fn use_text(&mut self, text: &str, font: &impl FontMetricsProvider) -> Vec<u16> {
        text.chars()
            .map(|ch| match font.glyph_index(ch) {
                Some(glyph) => self.use_char(ch as u32, glyph),
                None => {
                    log::debug!("No glyph for U+{:04X}, using .notdef", ch as u32);
                    self.glyphs.insert(0)
                },
            })
            .collect()
    }

    /// Used characters mapped to their original glyph IDs.
    pub fn used_chars(&self) -> &BTreeMap<u32, u16> {
        &self.used_chars
    }

    /// Glyph map handed to [`subset_font`].
    pub fn glyph_map(&self) -> &GlyphIndexMap {
        &self.glyphs
    }

    /// Number of glyphs in the subset (before composite closure).
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether no characters were used.
    pub fn is_empty(&self) -> bool {
        self.used_chars.is_empty()
    }

    /// Deterministic 6-letter tag derived from the used glyphs.
    ///
    /// The tag is FNV-1a over the big-endian glyph IDs in subset order, so it
    /// is the same on every platform and toolchain.
    pub fn subset_tag(&self) -> String {
        let mut hasher = FnvHasher::default();
        for glyph in self.glyphs.originals() {
            hasher.write(&glyph.to_be_bytes());
        }
        let mut h = hasher.finish();
        let mut tag = String::with_capacity(6);
        for _ in 0..6 {
            tag.push(((h % 26) as u8 + b'A') as char);
            h /= 26;
        }
        tag
    }

    /// Subset name such as "ABCDEF+Arial".
    pub fn subset_font_name(&self, base_name: &str) -> String {
        format!("{}+{}", self.subset_tag(), base_name)
    }
}

/// Location of one component's glyph index inside a composite glyph.
#[derive(Debug, Clone, Copy)]
struct ComponentRecord {
    glyph_index: u16,
    index_position: usize,
}

/// Byte range of a glyph inside the font buffer, `None` for empty glyphs.
fn glyph_range(font: &TrueTypeFont, glyph: u16) -> Result<Option<(usize, usize)>> {
    let glyf = font
        .directory()
        .get(b"glyf")
        .ok_or_else(|| Error::MalformedFont("glyf table not found".to_string()))?;
    let loca = font.loca();
    let i = glyph as usize;
    if i + 1 >= loca.len() {
        return Err(Error::InvalidArgument(format!(
            "glyph {} out of range ({} glyphs)",
            glyph,
            font.num_glyphs()
        )));
    }
    if loca[i] >= loca[i + 1] {
        return Ok(None);
    }
    let start = glyf.offset as usize + loca[i] as usize;
    let end = glyf.offset as usize + loca[i + 1] as usize;
    Ok(Some((start, end)))
}

/// Component records of a glyph; empty for simple and empty glyphs.
fn component_records(
    reader: &FontFileReader,
    font: &TrueTypeFont,
    glyph: u16,
) -> Result<Vec<ComponentRecord>> {
    let Some((start, end)) = glyph_range(font, glyph)? else {
        return Ok(Vec::new());
    };
    if reader.read_i16_at(start)? >= 0 {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    // numberOfContours and bbox
    let mut position = start + 10;
    loop {
        if position + 4 > end {
            return Err(Error::MalformedFont(format!(
                "composite glyph {} runs past its end",
                glyph
            )));
        }
        let flags = ComponentFlags::from_bits_retain(reader.read_u16_at(position)?);
        let glyph_index = reader.read_u16_at(position + 2)?;
        if glyph_index >= font.num_glyphs() {
            return Err(Error::MalformedFont(format!(
                "composite glyph {} references glyph {} beyond numGlyphs {}",
                glyph,
                glyph_index,
                font.num_glyphs()
            )));
        }
        records.push(ComponentRecord {
            glyph_index,
            index_position: position + 2,
        });

        position += 4;
        position += if flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS) { 4 } else { 2 };
        if flags.contains(ComponentFlags::WE_HAVE_A_SCALE) {
            position += 2;
        } else if flags.contains(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            position += 4;
        } else if flags.contains(ComponentFlags::WE_HAVE_A_TWO_BY_TWO) {
            position += 8;
        }

        if !flags.contains(ComponentFlags::MORE_COMPONENTS) {
            break;
        }
    }
    Ok(records)
}

fn check_subsettable(font: &TrueTypeFont) -> Result<()> {
    if font.flavor() == FontFlavor::Cff {
        return Err(Error::UnsupportedFontFlavor(
            "CFF outlines cannot be embedded as a TrueType subset".to_string(),
        ));
    }
    for tag in [b"glyf", b"hhea", b"maxp", b"hmtx", b"head"] {
        if !font.directory().contains(tag) {
            return Err(Error::MalformedFont(format!(
                "{} table not found",
                String::from_utf8_lossy(tag)
            )));
        }
    }
    Ok(())
}

fn close_over(
    reader: &FontFileReader,
    font: &TrueTypeFont,
    glyphs: &GlyphIndexMap,
) -> Result<GlyphIndexMap> {
    let mut closed = glyphs.clone();
    let mut scan: BTreeSet<u16> = closed.originals().iter().copied().collect();
    let mut round = 0;

    while !scan.is_empty() {
        round += 1;
        let mut added = Vec::new();
        for &glyph in &scan {
            for record in component_records(reader, font, glyph)? {
                if !closed.contains(record.glyph_index) && !added.contains(&record.glyph_index) {
                    added.push(record.glyph_index);
                }
            }
        }
        for &glyph in &added {
            closed.insert(glyph);
        }
        if !added.is_empty() {
            log::debug!("Composite closure round {}: {} glyphs added", round, added.len());
        }
        scan = added.into_iter().collect();
    }

    Ok(closed)
}

/// Close a glyph map over composite glyph references.
///
/// Glyphs already in the map keep their subset indices; components found in
/// each round are appended in ascending parent order, then record order.
pub fn composite_closure(font: &TrueTypeFont, glyphs: &GlyphIndexMap) -> Result<GlyphIndexMap> {
    check_subsettable(font)?;
    let reader = FontFileReader::new(font.data().to_vec());
    close_over(&reader, font, glyphs)
}

/// Rewrite component glyph indices of every composite glyph to subset indices.
fn remap_composites(
    working: &mut FontFileReader,
    font: &TrueTypeFont,
    glyphs: &GlyphIndexMap,
) -> Result<()> {
    let mut rewritten = HashSet::new();
    for &original in glyphs.originals() {
        let Some((start, _)) = glyph_range(font, original)? else {
            continue;
        };
        // glyphs sharing outline data are rewritten once
        if !rewritten.insert(start) {
            continue;
        }
        for record in component_records(working, font, original)? {
            match glyphs.get(record.glyph_index) {
                Some(subset) => working.write_u16_at(record.index_position, subset)?,
                None => {
                    log::warn!(
                        "Composite glyph {} references unmapped glyph {}, remaining components left as is",
                        original,
                        record.glyph_index
                    );
                    break;
                },
            }
        }
    }
    Ok(())
}

/// Table being assembled: tag plus its offset/length in the output.
struct EmittedTable {
    tag: [u8; 4],
    offset: usize,
    length: usize,
}

fn pad4(output: &mut Vec<u8>) {
    while output.len() % 4 != 0 {
        output.push(0);
    }
}

fn copy_table(font: &TrueTypeFont, tag: &[u8; 4]) -> Result<Option<Vec<u8>>> {
    let Some(entry) = font.directory().get(tag) else {
        return Ok(None);
    };
    let start = entry.offset as usize;
    let end = start + entry.length as usize;
    font.data()
        .get(start..end)
        .map(|bytes| Some(bytes.to_vec()))
        .ok_or(Error::OutOfRange {
            offset: end,
            len: font.data().len(),
        })
}

fn patch_u16(table: &mut [u8], offset: usize, value: u16, tag: &str) -> Result<()> {
    match table.get_mut(offset..offset + 2) {
        Some(slot) => {
            slot.copy_from_slice(&value.to_be_bytes());
            Ok(())
        },
        None => Err(Error::MalformedFont(format!("{} table is truncated", tag))),
    }
}

/// Build a standalone TrueType font holding the glyphs of `glyphs` and their
/// composite dependencies, renumbered to subset indices.
pub fn subset_font(font: &TrueTypeFont, glyphs: &GlyphIndexMap) -> Result<Vec<u8>> {
    check_subsettable(font)?;
    if let Some(&bad) = glyphs.originals().iter().find(|&&g| g >= font.num_glyphs()) {
        return Err(Error::InvalidArgument(format!(
            "glyph {} out of range ({} glyphs)",
            bad,
            font.num_glyphs()
        )));
    }

    let mut working = FontFileReader::new(font.data().to_vec());
    let closed = close_over(&working, font, glyphs)?;
    remap_composites(&mut working, font, &closed)?;
    let glyph_count = closed.len() as u16;

    let mut head = copy_table(font, b"head")?.unwrap_or_default();
    if head.len() < 54 {
        return Err(Error::MalformedFont("head table is truncated".to_string()));
    }
    head[HEAD_CHECKSUM_ADJUSTMENT_OFFSET..HEAD_CHECKSUM_ADJUSTMENT_OFFSET + 4].fill(0);
    patch_u16(&mut head, HEAD_INDEX_TO_LOC_FORMAT_OFFSET, 1, "head")?;

    let mut hhea = copy_table(font, b"hhea")?.unwrap_or_default();
    patch_u16(&mut hhea, HHEA_NUMBER_OF_HMETRICS_OFFSET, glyph_count, "hhea")?;

    let metrics = font.glyph_metrics();
    let mut hmtx = Vec::with_capacity(closed.len() * 4);
    for &original in closed.originals() {
        let metric = metrics.get(original as usize).cloned().unwrap_or_default();
        hmtx.extend_from_slice(&metric.advance_width.to_be_bytes());
        hmtx.extend_from_slice(&metric.left_side_bearing.to_be_bytes());
    }

    let mut maxp = copy_table(font, b"maxp")?.unwrap_or_default();
    patch_u16(&mut maxp, MAXP_NUM_GLYPHS_OFFSET, glyph_count, "maxp")?;

    let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
        (*b"head", head),
        (*b"hhea", hhea),
        (*b"hmtx", hmtx),
        (*b"maxp", maxp),
    ];
    for tag in [b"cvt ", b"fpgm", b"prep"] {
        match copy_table(font, tag)? {
            Some(data) => tables.push((*tag, data)),
            None => log::debug!("{} not present in source font", String::from_utf8_lossy(tag)),
        }
    }

    // glyf in subset order; loca records where each glyph landed
    let mut glyf = Vec::new();
    let mut loca = Vec::with_capacity((closed.len() + 1) * 4);
    for &original in closed.originals() {
        loca.extend_from_slice(&(glyf.len() as u32).to_be_bytes());
        if let Some((start, end)) = glyph_range(font, original)? {
            glyf.extend_from_slice(&working.get_bytes(start, end - start)?);
            if glyf.len() % 2 != 0 {
                glyf.push(0);
            }
        }
    }
    loca.extend_from_slice(&(glyf.len() as u32).to_be_bytes());
    tables.push((*b"loca", loca));
    tables.push((*b"glyf", glyf));

    let output = assemble(tables)?;
    log::debug!(
        "Subset of '{}': {} glyphs, {} bytes",
        font.postscript_name(),
        glyph_count,
        output.len()
    );
    Ok(output)
}

/// Binary search header fields for `count` directory entries.
fn search_params(count: u16) -> (u16, u16, u16) {
    let mut entry_selector = 0u16;
    while count >= 2 && (1u16 << (entry_selector + 1)) <= count {
        entry_selector += 1;
    }
    let search_range = (1u16 << entry_selector) * 16;
    let range_shift = (count * 16).saturating_sub(search_range);
    (search_range, entry_selector, range_shift)
}

/// Write directory and tables, then the checksum adjustment.
fn assemble(tables: Vec<([u8; 4], Vec<u8>)>) -> Result<Vec<u8>> {
    let count = tables.len() as u16;
    let (search_range, entry_selector, range_shift) = search_params(count);

    let mut output = Vec::new();
    output.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    output.extend_from_slice(&count.to_be_bytes());
    output.extend_from_slice(&search_range.to_be_bytes());
    output.extend_from_slice(&entry_selector.to_be_bytes());
    output.extend_from_slice(&range_shift.to_be_bytes());
    let directory_start = output.len();
    output.resize(directory_start + 16 * tables.len(), 0);

    let mut emitted = Vec::with_capacity(tables.len());
    for (tag, data) in tables {
        let offset = output.len();
        output.extend_from_slice(&data);
        pad4(&mut output);
        emitted.push(EmittedTable {
            tag,
            offset,
            length: data.len(),
        });
    }

    let mut file = FontFileReader::new(output);
    let mut sorted: Vec<&EmittedTable> = emitted.iter().collect();
    sorted.sort_by_key(|t| t.tag);
    let mut head_offset = None;
    for (i, table) in sorted.iter().enumerate() {
        let checksum = table_checksum(file.get_bytes(table.offset, table.length)?.as_slice());
        let entry = directory_start + i * 16;
        file.write_u32_at(entry, u32::from_be_bytes(table.tag))?;
        file.write_u32_at(entry + 4, checksum)?;
        file.write_u32_at(entry + 8, table.offset as u32)?;
        file.write_u32_at(entry + 12, table.length as u32)?;
        if &table.tag == b"head" {
            head_offset = Some(table.offset);
        }
    }

    if let Some(offset) = head_offset {
        let adjustment = CHECKSUM_MAGIC.wrapping_sub(table_checksum(file.bytes()));
        file.write_u32_at(offset + HEAD_CHECKSUM_ADJUSTMENT_OFFSET, adjustment)?;
    }
    Ok(file.into_bytes())
}
