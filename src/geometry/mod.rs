//! Geometric primitives for painting.
//!
//! Coordinates handed to the painters are in points with the origin at the
//! top-left of the page; the painters convert them to device units.

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use afp_oxide::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use afp_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// 2D affine transform `[a b c d e f]`, mapping (x, y) to
/// (a·x + c·y + e, b·x + d·y + f).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    /// Scale x
    pub a: f32,
    /// Shear y
    pub b: f32,
    /// Shear x
    pub c: f32,
    /// Scale y
    pub d: f32,
    /// Translate x
    pub e: f32,
    /// Translate y
    pub f: f32,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// A pure translation.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    /// A pure scale.
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    /// Translation along x.
    pub fn translate_x(&self) -> f32 {
        self.e
    }

    /// Translation along y.
    pub fn translate_y(&self) -> f32 {
        self.f
    }

    /// `self` applied after `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use afp_oxide::geometry::{AffineTransform, Point};
    ///
    /// let t = AffineTransform::translation(10.0, 0.0).concat(&AffineTransform::scale(2.0, 2.0));
    /// assert_eq!(t.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    /// ```
    pub fn concat(&self, other: &AffineTransform) -> AffineTransform {
        AffineTransform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Map a point.
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Map a distance vector (translation ignored).
    pub fn transform_vector(&self, dx: f32, dy: f32) -> (f32, f32) {
        (self.a * dx + self.c * dy, self.b * dx + self.d * dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_points_normalizes() {
        let r = Rect::from_points(110.0, 70.0, 10.0, 20.0);
        assert_eq!(r, Rect::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert_eq!(r.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_identity_transform() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(AffineTransform::identity().transform_point(p), p);
    }

    #[test]
    fn test_concat_order() {
        let scale = AffineTransform::scale(2.0, 3.0);
        let shift = AffineTransform::translation(5.0, 7.0);
        // scale first, then shift
        let t = shift.concat(&scale);
        assert_eq!(t.transform_point(Point::new(1.0, 1.0)), Point::new(7.0, 10.0));
        assert_eq!(t.translate_x(), 5.0);
        assert_eq!(t.transform_vector(1.0, 1.0), (2.0, 3.0));
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(Point::new(0.0, 0.0).midpoint(&Point::new(4.0, 2.0)), Point::new(2.0, 1.0));
    }
}
