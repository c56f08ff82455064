//! Vector shapes for the graphics adapter.

use crate::geometry::{Point, Rect};

/// One segment of a path, coordinates in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Start a new subpath
    MoveTo(Point),
    /// Straight line to a point
    LineTo(Point),
    /// Quadratic Bézier: control point, end point
    QuadTo(Point, Point),
    /// Cubic Bézier: two control points, end point
    CubicTo(Point, Point, Point),
    /// Close the current subpath
    Close,
}

/// A drawable shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Straight line between two points
    Line(Point, Point),
    /// Axis-aligned rectangle
    Rectangle(Rect),
    /// Ellipse inscribed in a rectangle
    Ellipse(Rect),
    /// General path
    Path(Vec<PathSegment>),
}

impl Shape {
    /// A path of straight lines through `points`, optionally closed.
    pub fn polyline(points: &[Point], close: bool) -> Self {
        let mut segments = Vec::with_capacity(points.len() + 1);
        for (i, &p) in points.iter().enumerate() {
            segments.push(if i == 0 {
                PathSegment::MoveTo(p)
            } else {
                PathSegment::LineTo(p)
            });
        }
        if close && !points.is_empty() {
            segments.push(PathSegment::Close);
        }
        Shape::Path(segments)
    }
}
