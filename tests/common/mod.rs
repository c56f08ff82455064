//! Synthetic sfnt fonts for the integration tests.
//!
//! The fonts are tiny but structurally complete: every table the reader and
//! the subsetter touch is present with correct offsets and checksums.

#![allow(dead_code)]

/// Glyph outline description.
#[derive(Debug, Clone)]
pub enum Glyph {
    /// One-point simple glyph with the given bounding box
    Simple([i16; 4]),
    /// Composite glyph referencing other glyphs
    Composite([i16; 4], Vec<u16>),
    /// No outline data
    Empty,
}

/// A glyph plus its metrics and PostScript name.
#[derive(Debug, Clone)]
pub struct GlyphSpec {
    pub name: &'static str,
    pub advance: u16,
    pub lsb: i16,
    pub outline: Glyph,
}

/// Inputs for one synthetic font.
#[derive(Debug, Clone)]
pub struct FontSpec {
    pub units_per_em: u16,
    pub full_name: String,
    pub postscript_name: String,
    pub family: String,
    pub glyphs: Vec<GlyphSpec>,
    /// (unicode, glyph) pairs for the format 4 cmap
    pub cmap: Vec<(u16, u16)>,
    /// (left glyph, right glyph, value) pairs for kern format 0
    pub kern: Vec<(u16, u16, i16)>,
    pub hhea_ascender: i16,
    pub hhea_descender: i16,
    /// OS/2 (typoAscender, typoDescender, xHeight, capHeight, fsType)
    pub os2: Option<(i16, i16, i16, i16, u16)>,
    /// Explicit hmtx entries; the rest only carry a left side bearing
    pub number_of_hmetrics: Option<u16>,
    pub long_loca: bool,
    pub with_fpgm: bool,
}

fn simple(name: &'static str, advance: u16, bbox: [i16; 4]) -> GlyphSpec {
    GlyphSpec {
        name,
        advance,
        lsb: bbox[0],
        outline: Glyph::Simple(bbox),
    }
}

impl FontSpec {
    /// A small Latin font:
    ///
    /// | glyph | name      | unicode | outline                  |
    /// |-------|-----------|---------|--------------------------|
    /// | 0     | .notdef   |         | simple                   |
    /// | 1     | space     | U+0020  | empty                    |
    /// | 2     | A         | U+0041  | simple                   |
    /// | 3     | B         | U+0042  | simple                   |
    /// | 4     | H         | U+0048  | simple, top 700          |
    /// | 5     | x         | U+0078  | simple, top 500          |
    /// | 6     | d         | U+0064  | simple, top 720          |
    /// | 7     | p         | U+0070  | simple, bottom -210      |
    /// | 8     | dieresis  | U+00A8  | simple                   |
    /// | 9     | Adieresis | U+00C4  | composite of 2 and 8     |
    /// | 10    | Aring     | U+00C5  | composite of 9 and 8     |
    /// | 11    | ring      |         | simple, unmapped         |
    pub fn latin() -> Self {
        let glyphs = vec![
            simple(".notdef", 500, [50, 0, 450, 700]),
            GlyphSpec {
                name: "space",
                advance: 250,
                lsb: 0,
                outline: Glyph::Empty,
            },
            simple("A", 600, [10, 0, 590, 700]),
            simple("B", 580, [60, 0, 540, 700]),
            simple("H", 700, [60, 0, 640, 700]),
            simple("x", 480, [20, 0, 460, 500]),
            simple("d", 560, [40, -10, 500, 720]),
            simple("p", 560, [60, -210, 520, 510]),
            simple("dieresis", 300, [40, 580, 260, 680]),
            GlyphSpec {
                name: "Adieresis",
                advance: 600,
                lsb: 10,
                outline: Glyph::Composite([10, 0, 590, 880], vec![2, 8]),
            },
            GlyphSpec {
                name: "Aring",
                advance: 600,
                lsb: 10,
                outline: Glyph::Composite([10, 0, 590, 960], vec![9, 8]),
            },
            simple("ring", 300, [60, 560, 240, 760]),
        ];
        let cmap = vec![
            (0x20, 1),
            (0x41, 2),
            (0x42, 3),
            (0x48, 4),
            (0x64, 6),
            (0x70, 7),
            (0x78, 5),
            (0xA8, 8),
            (0xC4, 9),
            (0xC5, 10),
        ];
        Self {
            units_per_em: 1000,
            full_name: "Synthetic Sans Regular".to_string(),
            postscript_name: "SyntheticSans-Regular".to_string(),
            family: "Synthetic Sans".to_string(),
            glyphs,
            cmap,
            kern: vec![(2, 3, -40), (3, 2, -25)],
            hhea_ascender: 800,
            hhea_descender: -200,
            os2: Some((780, -220, 500, 700, 0)),
            number_of_hmetrics: None,
            long_loca: false,
            with_fpgm: true,
        }
    }

    /// Same font with a different full name, for collections.
    pub fn named(mut self, full_name: &str, postscript_name: &str) -> Self {
        self.full_name = full_name.to_string();
        self.postscript_name = postscript_name.to_string();
        self
    }

    pub fn num_glyphs(&self) -> u16 {
        self.glyphs.len() as u16
    }
}

fn be16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn bei16(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn be32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Sum of big-endian words, zero padded.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

fn glyph_bytes(glyph: &Glyph) -> Vec<u8> {
    let mut out = Vec::new();
    match glyph {
        Glyph::Simple(bbox) => {
            bei16(&mut out, 1);
            for &v in bbox {
                bei16(&mut out, v);
            }
            // endPtsOfContours, instructionLength, one on-curve flag
            be16(&mut out, 0);
            be16(&mut out, 0);
            out.push(0x01);
            bei16(&mut out, bbox[0]);
            bei16(&mut out, bbox[1]);
        },
        Glyph::Composite(bbox, components) => {
            bei16(&mut out, -1);
            for &v in bbox {
                bei16(&mut out, v);
            }
            for (i, &component) in components.iter().enumerate() {
                // ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES
                let mut flags = 0x0003u16;
                if i + 1 < components.len() {
                    flags |= 0x0020;
                }
                be16(&mut out, flags);
                be16(&mut out, component);
                bei16(&mut out, 0);
                bei16(&mut out, (i as i16) * 100);
            }
        },
        Glyph::Empty => {},
    }
    if out.len() % 2 != 0 {
        out.push(0);
    }
    out
}

fn head_table(spec: &FontSpec) -> Vec<u8> {
    let mut t = Vec::new();
    be32(&mut t, 0x0001_0000);
    be32(&mut t, 0x0001_0000);
    // checkSumAdjustment, patched after assembly
    be32(&mut t, 0);
    be32(&mut t, 0x5F0F_3CF5);
    be16(&mut t, 0x000B);
    be16(&mut t, spec.units_per_em);
    t.extend_from_slice(&[0; 16]);
    for v in [-50i16, -250, 1000, 1000] {
        bei16(&mut t, v);
    }
    // macStyle, lowestRecPPEM, fontDirectionHint
    be16(&mut t, 0);
    be16(&mut t, 8);
    bei16(&mut t, 2);
    bei16(&mut t, if spec.long_loca { 1 } else { 0 });
    bei16(&mut t, 0);
    assert_eq!(t.len(), 54);
    t
}

fn hhea_table(spec: &FontSpec, number_of_hmetrics: u16) -> Vec<u8> {
    let mut t = Vec::new();
    be32(&mut t, 0x0001_0000);
    bei16(&mut t, spec.hhea_ascender);
    bei16(&mut t, spec.hhea_descender);
    t.extend_from_slice(&[0; 26]);
    be16(&mut t, number_of_hmetrics);
    assert_eq!(t.len(), 36);
    t
}

fn maxp_table(spec: &FontSpec) -> Vec<u8> {
    let mut t = Vec::new();
    be32(&mut t, 0x0000_5000);
    be16(&mut t, spec.num_glyphs());
    t
}

fn hmtx_table(spec: &FontSpec, number_of_hmetrics: u16) -> Vec<u8> {
    let mut t = Vec::new();
    for (i, glyph) in spec.glyphs.iter().enumerate() {
        if i < number_of_hmetrics as usize {
            be16(&mut t, glyph.advance);
        }
        bei16(&mut t, glyph.lsb);
    }
    t
}

fn cmap_table(spec: &FontSpec) -> Vec<u8> {
    let mut mappings = spec.cmap.clone();
    mappings.sort();
    let seg_count = mappings.len() as u16 + 1;

    let mut sub = Vec::new();
    be16(&mut sub, 4);
    // length, patched below
    be16(&mut sub, 0);
    be16(&mut sub, 0);
    be16(&mut sub, seg_count * 2);
    sub.extend_from_slice(&[0; 6]);
    for &(code, _) in &mappings {
        be16(&mut sub, code);
    }
    be16(&mut sub, 0xFFFF);
    be16(&mut sub, 0);
    for &(code, _) in &mappings {
        be16(&mut sub, code);
    }
    be16(&mut sub, 0xFFFF);
    for &(code, glyph) in &mappings {
        be16(&mut sub, glyph.wrapping_sub(code));
    }
    be16(&mut sub, 1);
    for _ in 0..seg_count {
        be16(&mut sub, 0);
    }
    let len = sub.len() as u16;
    sub[2..4].copy_from_slice(&len.to_be_bytes());

    let mut t = Vec::new();
    be16(&mut t, 0);
    be16(&mut t, 1);
    be16(&mut t, 3);
    be16(&mut t, 1);
    be32(&mut t, 12);
    t.extend(sub);
    t
}

fn post_table(spec: &FontSpec) -> Vec<u8> {
    let mut t = Vec::new();
    be32(&mut t, 0x0002_0000);
    // italicAngle -12.5
    be32(&mut t, 0xFFF3_8000);
    bei16(&mut t, -100);
    bei16(&mut t, 50);
    be32(&mut t, 0);
    t.extend_from_slice(&[0; 16]);
    be16(&mut t, spec.num_glyphs());
    for i in 0..spec.glyphs.len() {
        be16(&mut t, 258 + i as u16);
    }
    for glyph in &spec.glyphs {
        t.push(glyph.name.len() as u8);
        t.extend_from_slice(glyph.name.as_bytes());
    }
    t
}

fn os2_table(values: (i16, i16, i16, i16, u16)) -> Vec<u8> {
    let (typo_ascender, typo_descender, x_height, cap_height, fs_type) = values;
    let mut t = vec![0u8; 96];
    t[0..2].copy_from_slice(&2u16.to_be_bytes());
    t[4..6].copy_from_slice(&400u16.to_be_bytes());
    t[8..10].copy_from_slice(&fs_type.to_be_bytes());
    t[68..70].copy_from_slice(&typo_ascender.to_be_bytes());
    t[70..72].copy_from_slice(&typo_descender.to_be_bytes());
    t[86..88].copy_from_slice(&x_height.to_be_bytes());
    t[88..90].copy_from_slice(&cap_height.to_be_bytes());
    t
}

fn name_table(spec: &FontSpec) -> Vec<u8> {
    let records: Vec<(u16, Vec<u8>)> = [
        (0u16, "Copyright test"),
        (1, spec.family.as_str()),
        (2, "Regular"),
        (4, spec.full_name.as_str()),
        (6, spec.postscript_name.as_str()),
    ]
    .iter()
    .map(|&(id, text)| (id, text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()))
    .collect();

    let mut t = Vec::new();
    be16(&mut t, 0);
    be16(&mut t, records.len() as u16);
    be16(&mut t, 6 + 12 * records.len() as u16);
    let mut strings = Vec::new();
    for (id, bytes) in &records {
        be16(&mut t, 3);
        be16(&mut t, 1);
        be16(&mut t, 1033);
        be16(&mut t, *id);
        be16(&mut t, bytes.len() as u16);
        be16(&mut t, strings.len() as u16);
        strings.extend_from_slice(bytes);
    }
    t.extend(strings);
    t
}

fn kern_table(pairs: &[(u16, u16, i16)]) -> Vec<u8> {
    let mut t = Vec::new();
    be16(&mut t, 0);
    be16(&mut t, 1);
    be16(&mut t, 0);
    be16(&mut t, 14 + 6 * pairs.len() as u16);
    be16(&mut t, 0x0001);
    be16(&mut t, pairs.len() as u16);
    t.extend_from_slice(&[0; 6]);
    for &(left, right, value) in pairs {
        be16(&mut t, left);
        be16(&mut t, right);
        bei16(&mut t, value);
    }
    t
}

/// All tables of `spec`, unsorted.
pub fn font_tables(spec: &FontSpec) -> Vec<([u8; 4], Vec<u8>)> {
    let number_of_hmetrics = spec.number_of_hmetrics.unwrap_or(spec.num_glyphs());

    let mut glyf = Vec::new();
    let mut offsets = Vec::new();
    for glyph in &spec.glyphs {
        offsets.push(glyf.len() as u32);
        glyf.extend(glyph_bytes(&glyph.outline));
    }
    offsets.push(glyf.len() as u32);
    let mut loca = Vec::new();
    for offset in offsets {
        if spec.long_loca {
            be32(&mut loca, offset);
        } else {
            be16(&mut loca, (offset / 2) as u16);
        }
    }

    let mut tables = vec![
        (*b"head", head_table(spec)),
        (*b"hhea", hhea_table(spec, number_of_hmetrics)),
        (*b"maxp", maxp_table(spec)),
        (*b"hmtx", hmtx_table(spec, number_of_hmetrics)),
        (*b"loca", loca),
        (*b"glyf", glyf),
        (*b"cmap", cmap_table(spec)),
        (*b"post", post_table(spec)),
        (*b"name", name_table(spec)),
    ];
    if let Some(values) = spec.os2 {
        tables.push((*b"OS/2", os2_table(values)));
    }
    if !spec.kern.is_empty() {
        tables.push((*b"kern", kern_table(&spec.kern)));
    }
    if spec.with_fpgm {
        tables.push((*b"fpgm", vec![0xB0, 0x00, 0x2C, 0x00]));
    }
    tables.sort_by_key(|(tag, _)| *tag);
    tables
}

/// Directory bytes and the offsets the tables will land at.
fn directory(tables: &[([u8; 4], Vec<u8>)], data_start: usize) -> (Vec<u8>, Vec<usize>) {
    let count = tables.len() as u16;
    let mut entry_selector = 0u16;
    while (1u16 << (entry_selector + 1)) <= count {
        entry_selector += 1;
    }
    let search_range = (1u16 << entry_selector) * 16;

    let mut dir = Vec::new();
    be32(&mut dir, 0x0001_0000);
    be16(&mut dir, count);
    be16(&mut dir, search_range);
    be16(&mut dir, entry_selector);
    be16(&mut dir, count * 16 - search_range);

    let mut offsets = Vec::new();
    let mut offset = data_start;
    for (tag, data) in tables {
        dir.extend_from_slice(tag);
        be32(&mut dir, checksum(data));
        be32(&mut dir, offset as u32);
        be32(&mut dir, data.len() as u32);
        offsets.push(offset);
        offset += (data.len() + 3) & !3;
    }
    (dir, offsets)
}

fn append_tables(out: &mut Vec<u8>, tables: &[([u8; 4], Vec<u8>)]) {
    for (_, data) in tables {
        out.extend_from_slice(data);
        while out.len() % 4 != 0 {
            out.push(0);
        }
    }
}

fn fix_head_adjustment(out: &mut [u8], head_offset: usize) {
    let adjustment = 0xB1B0_AFBAu32.wrapping_sub(checksum(out));
    out[head_offset + 8..head_offset + 12].copy_from_slice(&adjustment.to_be_bytes());
}

/// A complete single-font sfnt file.
pub fn build_font(spec: &FontSpec) -> Vec<u8> {
    let tables = font_tables(spec);
    let (dir, offsets) = directory(&tables, 12 + 16 * tables.len());
    let mut out = dir;
    append_tables(&mut out, &tables);
    let head_index = tables.iter().position(|(tag, _)| tag == b"head").unwrap();
    fix_head_adjustment(&mut out, offsets[head_index]);
    out
}

/// A TrueType Collection holding every spec, in order.
pub fn build_collection(specs: &[FontSpec]) -> Vec<u8> {
    let all_tables: Vec<_> = specs.iter().map(font_tables).collect();
    let header_len = 12 + 4 * specs.len();
    let directory_lens: Vec<usize> = all_tables.iter().map(|t| 12 + 16 * t.len()).collect();

    let mut directory_offsets = Vec::new();
    let mut offset = header_len;
    for len in &directory_lens {
        directory_offsets.push(offset);
        offset += len;
    }
    let mut data_start = (offset + 3) & !3;

    let mut out = Vec::new();
    out.extend_from_slice(b"ttcf");
    be32(&mut out, 0x0001_0000);
    be32(&mut out, specs.len() as u32);
    for &dir_offset in &directory_offsets {
        be32(&mut out, dir_offset as u32);
    }
    for tables in &all_tables {
        let (dir, _) = directory(tables, data_start);
        out.extend(dir);
        data_start += tables.iter().map(|(_, d)| (d.len() + 3) & !3).sum::<usize>();
    }
    while out.len() % 4 != 0 {
        out.push(0);
    }
    for tables in &all_tables {
        append_tables(&mut out, tables);
    }
    out
}

/// Parse an sfnt directory into (tag, checksum, offset, length) records.
pub fn parse_directory(data: &[u8]) -> Vec<([u8; 4], u32, usize, usize)> {
    let count = u16::from_be_bytes([data[4], data[5]]) as usize;
    (0..count)
        .map(|i| {
            let e = &data[12 + 16 * i..28 + 16 * i];
            let word = |at: usize| u32::from_be_bytes([e[at], e[at + 1], e[at + 2], e[at + 3]]);
            ([e[0], e[1], e[2], e[3]], word(4), word(8) as usize, word(12) as usize)
        })
        .collect()
}

/// Bytes of one table of an sfnt file.
pub fn table<'a>(data: &'a [u8], tag: &[u8; 4]) -> Option<&'a [u8]> {
    parse_directory(data)
        .into_iter()
        .find(|(t, _, _, _)| t == tag)
        .map(|(_, _, offset, length)| &data[offset..offset + length])
}

pub fn u16_at(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

pub fn u32_at(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Initialise test logging once.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
