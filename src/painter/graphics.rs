//! Vector shapes onto GOCA drawing orders.
//!
//! Lines, rectangles and ellipses have direct orders. General paths are
//! walked segment by segment; cubic curves have no GOCA order and are
//! approximated by quadratic fillets.

use super::{round_half_up, PaintingState};
use crate::elements::{PathSegment, Shape};
use crate::geometry::Point;
use crate::writer::GraphicsObject;

/// Quadratic pieces per cubic curve.
const QUADRATICS_PER_CUBIC: usize = 4;

/// Split a cubic Bézier into quadratic curves `[start, control, end]`.
///
/// The cubic is halved twice with de Casteljau; each quarter is replaced by
/// the quadratic whose control point is `(3(c1 + c2) - (p0 + p3)) / 4`.
pub fn cubic_to_quadratics(p0: Point, c1: Point, c2: Point, p3: Point) -> Vec<[Point; 3]> {
    let mut cubics = vec![[p0, c1, c2, p3]];
    while cubics.len() < QUADRATICS_PER_CUBIC {
        cubics = cubics.iter().flat_map(|c| split_cubic(c)).collect();
    }
    cubics
        .iter()
        .map(|&[p0, c1, c2, p3]| {
            let control = Point::new(
                (3.0 * (c1.x + c2.x) - (p0.x + p3.x)) / 4.0,
                (3.0 * (c1.y + c2.y) - (p0.y + p3.y)) / 4.0,
            );
            [p0, control, p3]
        })
        .collect()
}

fn split_cubic(c: &[Point; 4]) -> [[Point; 4]; 2] {
    let p01 = c[0].midpoint(&c[1]);
    let p12 = c[1].midpoint(&c[2]);
    let p23 = c[2].midpoint(&c[3]);
    let p012 = p01.midpoint(&p12);
    let p123 = p12.midpoint(&p23);
    let mid = p012.midpoint(&p123);
    [[c[0], p01, p012, mid], [mid, p123, p23, c[3]]]
}

/// Draws shapes into a graphics object.
#[derive(Debug, Clone)]
pub struct GraphicsPainter {
    state: PaintingState,
}

impl GraphicsPainter {
    /// Create a painter for a painting state.
    pub fn new(state: PaintingState) -> Self {
        Self { state }
    }

    fn device(&self, p: Point) -> (i32, i32) {
        let conv = self.state.unit_converter();
        let scaled = Point::new(conv.pt_to_units(p.x), conv.pt_to_units(p.y));
        let mapped = self.state.transform.transform_point(scaled);
        (round_half_up(mapped.x), round_half_up(mapped.y))
    }

    /// Emit `shape`, filled when `fill` is set, else stroked.
    pub fn draw(&self, graphics: &mut GraphicsObject, shape: &Shape, fill: bool) {
        graphics.set_color(&self.state.color);
        if !fill {
            let width = self.state.line_width.round().clamp(1.0, 255.0) as u8;
            graphics.set_line_width(width);
        }
        if fill {
            graphics.begin_area(false);
        }
        match shape {
            Shape::Line(from, to) => {
                graphics.add_line(&[self.device(*from), self.device(*to)], false);
            },
            Shape::Rectangle(rect) => {
                let (x1, y1) = self.device(Point::new(rect.x, rect.y));
                let (x2, y2) = self.device(Point::new(rect.right(), rect.bottom()));
                graphics.add_box(x1, y1, x2, y2);
            },
            Shape::Ellipse(rect) => {
                let (cx, cy) = self.device(rect.center());
                let (right, bottom) = self.device(Point::new(rect.right(), rect.bottom()));
                let rx = (right - cx).abs();
                let ry = (bottom - cy).abs();
                graphics.set_arc_parameters(rx, 0, 0, ry);
                graphics.add_full_arc(cx, cy, 1.0);
            },
            Shape::Path(segments) => self.draw_path(graphics, segments),
        }
        if fill {
            graphics.end_area();
        }
    }

    fn draw_path(&self, graphics: &mut GraphicsObject, segments: &[PathSegment]) {
        let mut start = Point::default();
        let mut current = Point::default();
        for segment in segments {
            match *segment {
                PathSegment::MoveTo(p) => {
                    let (x, y) = self.device(p);
                    graphics.set_current_position(x, y);
                    start = p;
                    current = p;
                },
                PathSegment::LineTo(p) => {
                    graphics.add_line(&[self.device(p)], true);
                    current = p;
                },
                PathSegment::QuadTo(c, p) => {
                    graphics.add_fillet(&[self.device(c), self.device(p)], true);
                    current = p;
                },
                PathSegment::CubicTo(c1, c2, p) => {
                    for [_, control, end] in cubic_to_quadratics(current, c1, c2, p) {
                        graphics.add_fillet(&[self.device(control), self.device(end)], true);
                    }
                    current = p;
                },
                PathSegment::Close => {
                    if current != start {
                        graphics.add_line(&[self.device(start)], true);
                    }
                    current = start;
                },
            }
        }
    }
}
