//! Integration tests for the border, rectangle and shape painters.

mod common;

use afp_oxide::config::AfpConfig;
use afp_oxide::elements::{BorderPaintingInfo, BorderStyle, Color, RectanglePaintingInfo, Shape};
use afp_oxide::geometry::{AffineTransform, Rect};
use afp_oxide::painter::{BorderPainter, GraphicsPainter, PaintingState, RectanglePainter};
use afp_oxide::writer::goca::{ObjectArea, GBOX};
use afp_oxide::writer::DataStream;
use common::init_logging;

fn painter(resolution: u16) -> BorderPainter {
    BorderPainter::new(PaintingState::new(resolution))
}

/// A double border is two rules a third of the width thick, spaced by two
/// thirds.
#[test]
fn test_double_horizontal() {
    let info = BorderPaintingInfo::new(0.0, 0.0, 90.0, 9.0, true, BorderStyle::Double);
    let lines = painter(72).lines(&info, 1000.0, 1000.0);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.thickness == 3));
    assert_eq!((lines[0].x1, lines[0].y1, lines[0].x2, lines[0].y2), (0, 0, 90, 0));
    assert_eq!((lines[1].x1, lines[1].y1, lines[1].x2, lines[1].y2), (0, 6, 90, 6));
}

/// Vertical double borders are offset along x.
#[test]
fn test_double_vertical() {
    let info = BorderPaintingInfo::new(10.0, 0.0, 19.0, 60.0, false, BorderStyle::Double);
    let lines = painter(72).lines(&info, 1000.0, 1000.0);
    assert_eq!(lines.len(), 2);
    assert_eq!((lines[0].x1, lines[0].y2), (10, 60));
    assert_eq!((lines[1].x1, lines[1].x2), (16, 16));
}

/// Dashes are three times the thickness long with equal gaps; a dash that
/// would reach the end is dropped.
#[test]
fn test_dashed_horizontal() {
    let info = BorderPaintingInfo::new(0.0, 0.0, 100.0, 5.0, true, BorderStyle::Dashed);
    let lines = painter(72).lines(&info, 1000.0, 1000.0);
    let starts: Vec<i32> = lines.iter().map(|l| l.x1).collect();
    assert_eq!(starts, vec![0, 30, 60]);
    assert!(lines.iter().all(|l| l.x2 - l.x1 == 15 && l.thickness == 5));
}

/// Vertical dashes advance along y.
#[test]
fn test_dashed_vertical() {
    let info = BorderPaintingInfo::new(0.0, 0.0, 2.0, 40.0, false, BorderStyle::Dashed);
    let lines = painter(72).lines(&info, 1000.0, 1000.0);
    let starts: Vec<i32> = lines.iter().map(|l| l.y1).collect();
    assert_eq!(starts, vec![0, 12, 24]);
    assert!(lines.iter().all(|l| l.x1 == l.x2 && l.y2 - l.y1 == 6));
}

/// Coordinates are converted from points to device units.
#[test]
fn test_resolution_conversion() {
    let info = BorderPaintingInfo::new(72.0, 36.0, 144.0, 37.2, true, BorderStyle::Solid);
    let lines = painter(240).lines(&info, 2040.0, 2640.0);
    assert_eq!(lines.len(), 1);
    assert_eq!((lines[0].x1, lines[0].y1, lines[0].x2), (240, 120, 480));
    assert_eq!(lines[0].thickness, 4);
}

/// Outset and inset paint like solid borders.
#[test]
fn test_inset_outset_as_solid() {
    for style in [BorderStyle::Inset, BorderStyle::Outset] {
        let info = BorderPaintingInfo::new(0.0, 0.0, 50.0, 2.0, true, style);
        let lines = painter(72).lines(&info, 100.0, 100.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].x2, 50);
    }
}

/// The current translation shifts an unrotated border.
#[test]
fn test_translation() {
    let state = PaintingState::new(72).with_transform(AffineTransform::translation(20.0, 30.0));
    let info = BorderPaintingInfo::new(0.0, 0.0, 10.0, 1.0, true, BorderStyle::Solid);
    let line = &BorderPainter::new(state).lines(&info, 100.0, 100.0)[0];
    assert_eq!((line.x1, line.y1, line.x2), (20, 30, 30));
}

/// Painted borders become rules inside the page's presentation text.
#[test]
fn test_paint_into_stream() {
    init_logging();
    let config = AfpConfig::default();
    let mut stream = DataStream::new(Vec::new(), config.clone());
    stream.start_document().unwrap();
    stream.start_page(2040, 2640, 0, config.resolution, config.resolution).unwrap();

    let painter = BorderPainter::new(PaintingState::new(config.resolution).with_color(Color::black()));
    let info = BorderPaintingInfo::new(72.0, 72.0, 540.0, 81.0, true, BorderStyle::Double);
    painter.paint(&info, &mut stream).unwrap();

    let contents = stream.current_page_mut().unwrap().contents().len();
    assert_eq!(contents, 1);
    stream.end_document().unwrap();

    let bytes = stream.into_inner();
    // two draw-i-axis-rule control sequences
    let rules = bytes.windows(2).filter(|w| w[1] == 0xE4 || w[1] == 0xE5).count();
    assert!(rules >= 2);
}

/// Negative extents paint nothing and are not an error.
#[test]
fn test_negative_extent_into_stream() {
    let mut stream = DataStream::new(Vec::new(), AfpConfig::default());
    stream.start_document().unwrap();
    stream.start_page(100, 100, 0, 240, 240).unwrap();
    let info = BorderPaintingInfo::new(10.0, 10.0, 0.0, 12.0, true, BorderStyle::Solid);
    painter(240).paint(&info, &mut stream).unwrap();
    assert!(stream.current_page_mut().unwrap().contents().is_empty());
}

/// Rectangles are a single rule as thick as the rectangle is high.
#[test]
fn test_rectangle_into_stream() {
    let mut stream = DataStream::new(Vec::new(), AfpConfig::default());
    stream.start_document().unwrap();
    stream.start_page(2040, 2640, 0, 240, 240).unwrap();

    let state = PaintingState::new(240).with_color(Color::from_rgb8(200, 0, 0));
    let rect = RectanglePaintingInfo::new(0.0, 0.0, 72.0, 36.0);
    let line = RectanglePainter::new(state.clone()).line(&rect, 2040.0, 2640.0);
    assert_eq!((line.x1, line.x2, line.thickness), (0, 240, 120));
    RectanglePainter::new(state).paint(&rect, &mut stream).unwrap();
    assert_eq!(stream.current_page_mut().unwrap().contents().len(), 1);
}

/// Shapes drawn into a graphics object land in its order list.
#[test]
fn test_graphics_painter_into_stream() {
    let mut stream = DataStream::new(Vec::new(), AfpConfig::default());
    stream.start_document().unwrap();
    stream.start_page(2040, 2640, 0, 240, 240).unwrap();
    let graphics = stream
        .create_graphics_object(ObjectArea {
            x: 0,
            y: 0,
            width: 2040,
            height: 2640,
            rotation: 0,
            x_resolution: 240,
            y_resolution: 240,
        })
        .unwrap();

    let painter = GraphicsPainter::new(PaintingState::new(240));
    painter.draw(graphics, &Shape::Rectangle(Rect::new(72.0, 72.0, 72.0, 36.0)), false);
    let boxes: Vec<&Vec<u8>> = graphics.orders().iter().filter(|o| o[0] == GBOX).collect();
    assert_eq!(boxes.len(), 1);
    assert_eq!(&boxes[0][4..], &[0x00, 0xF0, 0x00, 0xF0, 0x01, 0xE0, 0x01, 0x68]);
    stream.end_document().unwrap();
}
