//! Line, border and rectangle painting requests.

use super::Color;

/// CSS/XSL border styles understood by the border painter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    /// No border
    None,
    /// Like `None`, but occupies space
    Hidden,
    /// Round dots
    Dotted,
    /// Square-ended dashes
    Dashed,
    /// Single solid line
    #[default]
    Solid,
    /// Two parallel solid lines
    Double,
    /// Carved into the page
    Groove,
    /// Raised from the page
    Ridge,
    /// Embedded look
    Inset,
    /// Embossed look
    Outset,
}

/// One rule in device units, ready for presentation text.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDataInfo {
    /// Start x
    pub x1: i32,
    /// Start y
    pub y1: i32,
    /// End x
    pub x2: i32,
    /// End y
    pub y2: i32,
    /// Line thickness
    pub thickness: i32,
    /// Line color
    pub color: Color,
    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: i32,
}

impl LineDataInfo {
    /// A black horizontal-or-vertical rule between two points.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, thickness: i32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            thickness,
            color: Color::black(),
            rotation: 0,
        }
    }

    /// Set the color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Whether the rule runs along x.
    pub fn is_horizontal(&self) -> bool {
        self.y1 == self.y2
    }
}

/// A border edge in points: the rectangle it covers and how to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderPaintingInfo {
    /// Left
    pub x1: f32,
    /// Top
    pub y1: f32,
    /// Right
    pub x2: f32,
    /// Bottom
    pub y2: f32,
    /// Whether the edge runs along x (top/bottom border)
    pub is_horizontal: bool,
    /// Border style
    pub style: BorderStyle,
    /// Border color
    pub color: Color,
}

impl BorderPaintingInfo {
    /// A black border edge.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, is_horizontal: bool, style: BorderStyle) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            is_horizontal,
            style,
            color: Color::black(),
        }
    }

    /// Set the color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Extent along x.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Extent along y.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// A filled rectangle in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectanglePaintingInfo {
    /// Left
    pub x: f32,
    /// Top
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl RectanglePaintingInfo {
    /// Create a rectangle request.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
