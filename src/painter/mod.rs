//! Painters: turn point-based painting requests into data stream calls.
//!
//! Layout code works in points with the current transform and page
//! rotation tracked in a [`PaintingState`]. The painters convert to device
//! units and apply the rotation offsets before handing rules and shapes to
//! the [`DataStream`](crate::writer::DataStream).

mod border;
mod graphics;
mod rectangle;

pub use border::BorderPainter;
pub use graphics::{cubic_to_quadratics, GraphicsPainter};
pub use rectangle::RectanglePainter;

use crate::elements::Color;
use crate::geometry::AffineTransform;

/// Points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Converts between points and device units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    resolution: u16,
}

impl UnitConverter {
    /// Converter for `resolution` units per inch.
    pub fn new(resolution: u16) -> Self {
        Self { resolution }
    }

    /// Units per inch.
    pub fn resolution(&self) -> u16 {
        self.resolution
    }

    /// Points to device units.
    ///
    /// # Examples
    ///
    /// ```
    /// use afp_oxide::painter::UnitConverter;
    ///
    /// assert_eq!(UnitConverter::new(240).pt_to_units(72.0), 240.0);
    /// ```
    pub fn pt_to_units(&self, pt: f32) -> f32 {
        pt * self.resolution as f32 / POINTS_PER_INCH
    }

    /// Device units to points.
    pub fn units_to_pt(&self, units: f32) -> f32 {
        units * POINTS_PER_INCH / self.resolution as f32
    }
}

/// Graphics state shared by the painters.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintingState {
    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: i32,
    /// Current transform; translations are in device units
    pub transform: AffineTransform,
    /// Current colour
    pub color: Color,
    /// Current line width in points
    pub line_width: f32,
    converter: UnitConverter,
}

impl PaintingState {
    /// Unrotated state with an identity transform.
    pub fn new(resolution: u16) -> Self {
        Self {
            rotation: 0,
            transform: AffineTransform::identity(),
            color: Color::black(),
            line_width: 1.0,
            converter: UnitConverter::new(resolution),
        }
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation.rem_euclid(360);
        self
    }

    /// Set the transform.
    pub fn with_transform(mut self, transform: AffineTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the colour.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Unit converter for the state's resolution.
    pub fn unit_converter(&self) -> &UnitConverter {
        &self.converter
    }
}

/// Round half up, the way device coordinates are snapped.
pub(crate) fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}
