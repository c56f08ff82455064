//! Integration tests for the TrueType reader.
//!
//! Fonts are generated by `common::build_font` so every value asserted here
//! is known from the builder's table layout.

mod common;

use afp_oxide::fonts::truetype::FontFlavor;
use afp_oxide::fonts::{read_font, FontMetricsProvider};
use afp_oxide::Error;
use common::{build_collection, build_font, init_logging, FontSpec};

/// Global metrics and names come straight from head, hhea, OS/2 and name.
#[test]
fn test_read_global_metrics() {
    init_logging();
    let font = read_font(build_font(&FontSpec::latin()), None).unwrap();

    assert_eq!(font.flavor(), FontFlavor::TrueType);
    assert_eq!(font.units_per_em(), 1000);
    assert_eq!(font.num_glyphs(), 12);
    assert_eq!(font.font_bbox(), [-50, -250, 1000, 1000]);
    assert_eq!(font.postscript_name(), "SyntheticSans-Regular");
    assert_eq!(font.full_name(), "Synthetic Sans Regular");
    assert_eq!(font.subfamily_name(), "Regular");
    assert_eq!(font.notice(), "Copyright test");
    assert!(font.family_names().contains("Synthetic Sans"));
    assert_eq!(font.weight_class(), 400);
    assert!(font.is_embeddable());
    assert_eq!(font.italic_angle(), -12.5);
    assert_eq!(font.underline_position(), -100);
    assert_eq!(font.underline_thickness(), 50);
    assert!(!font.is_fixed_pitch());
}

/// The OS/2 typographic values win when they fit inside the em box.
#[test]
fn test_os2_vertical_metrics() {
    let font = read_font(build_font(&FontSpec::latin()), None).unwrap();
    assert_eq!(font.ascender(), 780);
    assert_eq!(font.descender(), -220);
    assert_eq!(font.cap_height(), 700);
    assert_eq!(font.x_height(), 500);
}

/// Without OS/2 and with an oversized hhea box, the glyph boxes of
/// 'd', 'p', 'H' and 'x' supply the vertical metrics.
#[test]
fn test_vertical_metrics_from_glyph_boxes() {
    init_logging();
    let mut spec = FontSpec::latin();
    spec.os2 = None;
    spec.hhea_ascender = 900;
    spec.hhea_descender = -300;
    let font = read_font(build_font(&spec), None).unwrap();

    assert_eq!(font.ascender(), 720);
    assert_eq!(font.descender(), -210);
    assert_eq!(font.cap_height(), 700);
    assert_eq!(font.x_height(), 500);
    assert_eq!(font.weight_class(), 400);
}

/// hhea values are used when OS/2 is absent and the box fits.
#[test]
fn test_hhea_vertical_metrics() {
    let mut spec = FontSpec::latin();
    spec.os2 = None;
    let font = read_font(build_font(&spec), None).unwrap();
    assert_eq!(font.ascender(), 800);
    assert_eq!(font.descender(), -200);
}

/// Per-glyph metrics carry advance, side bearing, box and name.
#[test]
fn test_glyph_metrics() {
    let font = read_font(build_font(&FontSpec::latin()), None).unwrap();
    let metrics = font.glyph_metrics();
    assert_eq!(metrics.len(), 12);

    let a = &metrics[2];
    assert_eq!(a.advance_width, 600);
    assert_eq!(a.left_side_bearing, 10);
    assert_eq!(a.bbox, [10, 0, 590, 700]);
    assert_eq!(a.name.as_deref(), Some("A"));
    assert_eq!(metrics[10].name.as_deref(), Some("Aring"));
}

/// A glyph without outline data inherits glyph 0's xMin in every corner.
#[test]
fn test_empty_glyph_bbox() {
    let font = read_font(build_font(&FontSpec::latin()), None).unwrap();
    assert_eq!(font.glyph_metrics()[1].bbox, [50, 50, 50, 50]);
}

/// Glyphs past numberOfHMetrics share the last advance width.
#[test]
fn test_short_hmtx() {
    let mut spec = FontSpec::latin();
    spec.number_of_hmetrics = Some(10);
    let font = read_font(build_font(&spec), None).unwrap();
    let metrics = font.glyph_metrics();
    assert_eq!(metrics[9].advance_width, 600);
    assert_eq!(metrics[10].advance_width, 600);
    assert_eq!(metrics[11].advance_width, 600);
    assert_eq!(metrics[11].left_side_bearing, 60);
}

/// Long loca offsets give the same glyph boxes as short ones.
#[test]
fn test_long_loca() {
    let mut spec = FontSpec::latin();
    spec.long_loca = true;
    let long = read_font(build_font(&spec), None).unwrap();
    let short = read_font(build_font(&FontSpec::latin()), None).unwrap();
    assert_eq!(long.index_to_loc_format(), 1);
    assert_eq!(short.index_to_loc_format(), 0);
    assert_eq!(long.glyph_metrics(), short.glyph_metrics());
    assert_eq!(long.loca(), short.loca());
}

/// The cmap maps both ways and compresses into contiguous segments.
#[test]
fn test_character_map() {
    let font = read_font(build_font(&FontSpec::latin()), None).unwrap();
    let cmap = font.cmap();
    assert_eq!(cmap.glyph_index(0x41), Some(2));
    assert_eq!(cmap.glyph_index(0xC5), Some(10));
    assert_eq!(cmap.glyph_index(0x43), None);
    assert_eq!(cmap.first_unicode(5), Some(0x78));
    assert_eq!(font.glyph_index('B'), Some(3));

    let segments = font.cmap_segments();
    // A and B are consecutive in both code and glyph space
    assert!(segments
        .iter()
        .any(|s| s.unicode_start == 0x41 && s.unicode_end == 0x42 && s.glyph_start_index == 2));
}

/// Kerning is exposed by glyph, by code point and by WinAnsi code.
#[test]
fn test_kerning() {
    let font = read_font(build_font(&FontSpec::latin()), None).unwrap();
    let kerning = font.kerning_table();
    assert_eq!(kerning.glyph_kerning(2, 3), -40);
    assert_eq!(kerning.unicode_kerning(0x42, 0x41), -25);
    assert_eq!(kerning.ansi_pairs.get(&(0x41, 0x42)), Some(&-40));
    assert_eq!(font.kerning('A', 'B'), -40);
    assert_eq!(font.kerning('A', 'x'), 0);
    assert_eq!(font.text_width("AB"), 600 + 580 - 40);
}

/// WinAnsi widths fall back to glyph 0's advance for unmapped codes.
#[test]
fn test_ansi_widths() {
    let font = read_font(build_font(&FontSpec::latin()), None).unwrap();
    let widths = font.ansi_widths();
    assert_eq!(widths[0x41], 600);
    assert_eq!(widths[0x20], 250);
    assert_eq!(widths[0xC4], 600);
    assert_eq!(widths[0x43], 500);
}

/// A restricted licence clears the embeddable flag.
#[test]
fn test_restricted_licence() {
    let mut spec = FontSpec::latin();
    spec.os2 = Some((780, -220, 500, 700, 0x0002));
    let font = read_font(build_font(&spec), None).unwrap();
    assert!(!font.is_embeddable());
}

/// Scaling to 1/1000 em is the identity for 1000-unit fonts.
#[test]
fn test_to_pdf_units() {
    let font = read_font(build_font(&FontSpec::latin()), None).unwrap();
    assert_eq!(font.to_pdf_units(600), 600);

    let mut spec = FontSpec::latin();
    spec.units_per_em = 2048;
    let font = read_font(build_font(&spec), None).unwrap();
    assert_eq!(font.to_pdf_units(1024), 500);
}

/// Collection members are selected by full name.
#[test]
fn test_collection_member_selection() {
    init_logging();
    let data = build_collection(&[
        FontSpec::latin().named("Synthetic Sans Regular", "SyntheticSans-Regular"),
        FontSpec::latin().named("Synthetic Sans Bold", "SyntheticSans-Bold"),
    ]);

    let bold = read_font(data.clone(), Some("Synthetic Sans Bold")).unwrap();
    assert_eq!(bold.postscript_name(), "SyntheticSans-Bold");
    assert_eq!(bold.glyph_metrics()[2].advance_width, 600);

    let regular = read_font(data, Some("Synthetic Sans Regular")).unwrap();
    assert_eq!(regular.postscript_name(), "SyntheticSans-Regular");
}

/// A missing or unknown collection member name lists what is available.
#[test]
fn test_collection_member_required() {
    let data = build_collection(&[FontSpec::latin().named("Only Member", "Only-Member")]);

    match read_font(data.clone(), None) {
        Err(Error::InvalidArgument(msg)) => assert!(msg.contains("Only Member")),
        other => panic!("expected InvalidArgument, got {:?}", other.map(|f| f.full_name().to_string())),
    }
    match read_font(data, Some("Missing")) {
        Err(Error::InvalidArgument(msg)) => {
            assert!(msg.contains("Missing"));
            assert!(msg.contains("Only Member"));
        },
        other => panic!("expected InvalidArgument, got {:?}", other.map(|f| f.full_name().to_string())),
    }
}

/// Truncated input and missing required tables are malformed fonts.
#[test]
fn test_malformed_fonts() {
    assert!(matches!(read_font(vec![0, 1, 0, 0], None), Err(Error::MalformedFont(_))));

    let mut spec_bytes = build_font(&FontSpec::latin());
    // rename the head entry so the table cannot be found
    let entries = common::parse_directory(&spec_bytes);
    let index = entries.iter().position(|e| &e.0 == b"head").unwrap();
    spec_bytes[12 + 16 * index..16 + 16 * index].copy_from_slice(b"heaX");
    assert!(matches!(read_font(spec_bytes, None), Err(Error::MalformedFont(_))));
}

/// The raw bytes are kept for subsetting.
#[test]
fn test_keeps_font_data() {
    let data = build_font(&FontSpec::latin());
    let font = read_font(data.clone(), None).unwrap();
    assert_eq!(font.data(), data.as_slice());
    assert!(font.directory().contains(b"glyf"));
    assert_eq!(font.loca().len(), 13);
}
