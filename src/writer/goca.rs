//! Graphics objects (GOCA).
//!
//! A graphics object is written as
//!
//! ```text
//! BGR
//!   BOG OBD OBP GDD EOG    object environment group
//!   GAD...                 one segment per field
//! EGR
//! ```
//!
//! Drawing orders are collected in memory and packed into chained segments
//! when the object is written.

use super::structured_field::{
    category, orientation, push_i24, push_u24, sf_type, triplet, Streamable,
    StructuredFieldWriter,
};
use crate::elements::Color;
use crate::error::{Error, Result};

/// Set Current Position
pub const GSCP: u8 = 0x21;
/// Line at given position
pub const GLINE: u8 = 0xC1;
/// Line at current position
pub const GCLINE: u8 = 0x81;
/// Box at given position
pub const GBOX: u8 = 0xC0;
/// Set Arc Parameters
pub const GSAP: u8 = 0x22;
/// Full Arc at given position
pub const GFARC: u8 = 0xC7;
/// Fillet at given position
pub const GFLT: u8 = 0xC5;
/// Fillet at current position
pub const GCFLT: u8 = 0x85;
/// Begin Area
pub const GBAR: u8 = 0x68;
/// End Area
pub const GEAR: u8 = 0x60;
/// Set Line Width
pub const GSLW: u8 = 0x19;
/// Set Line Type
pub const GSLT: u8 = 0x18;
/// Set Process Color
pub const GSPCOL: u8 = 0xB2;

/// Segment header length in bytes.
const SEGMENT_HEADER_LENGTH: usize = 14;
/// Points per line or fillet order (the order length is one byte).
const MAX_POINTS_PER_ORDER: usize = 63;

/// Line types of Set Line Type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LineType {
    /// Default
    Default = 0x00,
    /// Dotted
    Dotted = 0x01,
    /// Short dashed
    ShortDashed = 0x02,
    /// Dash dot
    DashDot = 0x03,
    /// Double dotted
    DoubleDotted = 0x04,
    /// Long dashed
    LongDashed = 0x05,
    /// Dash double dot
    DashDoubleDot = 0x06,
    /// Solid
    Solid = 0x07,
    /// Invisible
    Invisible = 0x08,
}

/// Where the object sits on the page and how it is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectArea {
    /// Origin x in page units
    pub x: i32,
    /// Origin y in page units
    pub y: i32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
    /// Page rotation in degrees
    pub rotation: i32,
    /// Units per inch along x
    pub x_resolution: u16,
    /// Units per inch along y
    pub y_resolution: u16,
}

impl ObjectArea {
    /// Descriptor (OBD) triplets.
    pub fn descriptor_data(&self) -> Vec<u8> {
        let mut data = triplet::descriptor_position(0x01);
        data.extend(triplet::measurement_units(self.x_resolution, self.y_resolution));
        data.extend(triplet::object_area_size(self.width, self.height));
        data
    }

    /// Position (OBP) data.
    pub fn position_data(&self) -> Result<Vec<u8>> {
        let x_orient = orientation(self.rotation)?;
        let y_orient = orientation(self.rotation + 90)?;
        let mut data = vec![0x01, 0x17];
        push_i24(&mut data, self.x);
        push_i24(&mut data, self.y);
        data.extend_from_slice(&x_orient);
        data.extend_from_slice(&y_orient);
        data.push(0x00);
        push_u24(&mut data, 0);
        push_u24(&mut data, 0);
        data.extend_from_slice(&[0x00, 0x00, 0x2D, 0x00]);
        // reference coordinate system: page
        data.push(0x01);
        Ok(data)
    }
}

/// A graphics object under construction.
#[derive(Debug, Clone)]
pub struct GraphicsObject {
    name: String,
    area: Option<ObjectArea>,
    orders: Vec<Vec<u8>>,
}

impl GraphicsObject {
    /// Create an object with no orders.
    pub fn new(name: String) -> Self {
        Self {
            name,
            area: None,
            orders: Vec::new(),
        }
    }

    /// Object name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Place the object on the page.
    pub fn set_view_port(&mut self, area: ObjectArea) -> Result<()> {
        orientation(area.rotation)?;
        self.area = Some(area);
        Ok(())
    }

    /// Placement, if set.
    pub fn area(&self) -> Option<&ObjectArea> {
        self.area.as_ref()
    }

    /// Encoded drawing orders.
    pub fn orders(&self) -> &[Vec<u8>] {
        &self.orders
    }

    /// Whether no orders were added.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn order(&mut self, code: u8, params: Vec<u8>) {
        let mut order = Vec::with_capacity(params.len() + 2);
        order.push(code);
        order.push(params.len() as u8);
        order.extend(params);
        self.orders.push(order);
    }

    /// Move the current position.
    pub fn set_current_position(&mut self, x: i32, y: i32) {
        self.order(GSCP, coords(&[(x, y)]));
    }

    /// Polyline. With `from_current` the first point is the current position
    /// and `points` only lists the following vertices.
    pub fn add_line(&mut self, points: &[(i32, i32)], from_current: bool) {
        self.add_points(GLINE, GCLINE, points, from_current);
    }

    /// Fillet (curve tangent to the polyline through `points`).
    pub fn add_fillet(&mut self, points: &[(i32, i32)], from_current: bool) {
        self.add_points(GFLT, GCFLT, points, from_current);
    }

    fn add_points(
        &mut self,
        at_given: u8,
        at_current: u8,
        points: &[(i32, i32)],
        from_current: bool,
    ) {
        if points.is_empty() {
            return;
        }
        let mut chunks = points.chunks(MAX_POINTS_PER_ORDER);
        if let Some(first) = chunks.next() {
            let code = if from_current { at_current } else { at_given };
            self.order(code, coords(first));
        }
        for rest in chunks {
            self.order(at_current, coords(rest));
        }
    }

    /// Box between two corners.
    pub fn add_box(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let mut params = vec![0x20, 0x00];
        params.extend(coords(&[(x1, y1), (x2, y2)]));
        self.order(GBOX, params);
    }

    /// Arc parameters for the following full arcs: the ellipse axes are
    /// `(p, s)` and `(r, q)` in the usual GOCA transform.
    pub fn set_arc_parameters(&mut self, p: i32, q: i32, r: i32, s: i32) {
        self.order(GSAP, coords(&[(p, q), (r, s)]));
    }

    /// Full arc centred at `(x, y)` scaled by `multiplier`.
    pub fn add_full_arc(&mut self, x: i32, y: i32, multiplier: f32) {
        let multiplier = multiplier.clamp(0.0, 255.0);
        let whole = multiplier.trunc();
        let fraction = ((multiplier - whole) * 256.0).round().min(255.0);
        let mut params = coords(&[(x, y)]);
        params.push(whole as u8);
        params.push(fraction as u8);
        self.order(GFARC, params);
    }

    /// Begin an area; the boundary is drawn when `draw_boundary` is set.
    pub fn begin_area(&mut self, draw_boundary: bool) {
        let flags = if draw_boundary { 0xC0 } else { 0x80 };
        self.orders.push(vec![GBAR, flags]);
    }

    /// End the current area.
    pub fn end_area(&mut self) {
        self.orders.push(vec![GEAR, 0x00]);
    }

    /// Line width multiplier.
    pub fn set_line_width(&mut self, width: u8) {
        self.orders.push(vec![GSLW, width]);
    }

    /// Line type.
    pub fn set_line_type(&mut self, line_type: LineType) {
        self.orders.push(vec![GSLT, line_type as u8]);
    }

    /// RGB drawing color.
    pub fn set_color(&mut self, color: &Color) {
        let mut params = vec![0x00, 0x01, 0, 0, 0, 0, 8, 8, 8, 0];
        params.extend_from_slice(&color.to_rgb_bytes());
        self.order(GSPCOL, params);
    }

    /// Pack the orders into chained segments whose encoded length is at
    /// most `max`.
    pub fn segments(&self, max: usize) -> Result<Vec<Vec<u8>>> {
        let room = max.saturating_sub(SEGMENT_HEADER_LENGTH);
        let mut packed: Vec<Vec<u8>> = Vec::new();
        let mut current = Vec::new();
        for order in &self.orders {
            if order.len() > room {
                return Err(Error::InvalidArgument(format!(
                    "graphics order {:#04x} does not fit in a segment of {} bytes",
                    order[0], max
                )));
            }
            if current.len() + order.len() > room {
                packed.push(std::mem::take(&mut current));
            }
            current.extend_from_slice(order);
        }
        if !current.is_empty() {
            packed.push(current);
        }

        let mut segments = Vec::with_capacity(packed.len());
        for (i, body) in packed.into_iter().enumerate() {
            let id = i as u32 + 1;
            let mut segment = vec![0x70, 0x0C];
            segment.extend_from_slice(&id.to_be_bytes());
            // appended segments continue their predecessor
            segment.push(0x00);
            segment.push(if i == 0 { 0x00 } else { 0x10 });
            segment.extend_from_slice(&(body.len() as u16).to_be_bytes());
            let predecessor: u32 = if i == 0 { 0 } else { id - 1 };
            segment.extend_from_slice(&predecessor.to_be_bytes());
            segment.extend(body);
            segments.push(segment);
        }
        Ok(segments)
    }

    fn data_descriptor(area: &ObjectArea) -> Vec<u8> {
        let mut data = vec![0xF7, 0x07, 0xB0, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00];
        data.extend_from_slice(&[0xF6, 0x11, 0x00, 0x00, 0x00]);
        let x_res = area.x_resolution.saturating_mul(10);
        let y_res = area.y_resolution.saturating_mul(10);
        data.extend_from_slice(&x_res.to_be_bytes());
        data.extend_from_slice(&y_res.to_be_bytes());
        data.extend_from_slice(&x_res.to_be_bytes());
        let right = area.width.min(i16::MAX as u32) as i16;
        let top = area.height.min(i16::MAX as u32) as i16;
        data.extend_from_slice(&0i16.to_be_bytes());
        data.extend_from_slice(&right.to_be_bytes());
        data.extend_from_slice(&0i16.to_be_bytes());
        data.extend_from_slice(&top.to_be_bytes());
        data
    }
}

fn coords(points: &[(i32, i32)]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(points.len() * 4);
    for &(x, y) in points {
        buf.extend_from_slice(&clamp16(x).to_be_bytes());
        buf.extend_from_slice(&clamp16(y).to_be_bytes());
    }
    buf
}

fn clamp16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

impl Streamable for GraphicsObject {
    fn write_to(&self, writer: &mut StructuredFieldWriter<'_>) -> Result<()> {
        let area = self.area.ok_or_else(|| {
            Error::IllegalState(format!("graphics object {} has no view port", self.name))
        })?;
        writer.named(sf_type::BEGIN, category::GRAPHICS, &self.name)?;
        writer.named(sf_type::BEGIN, category::OBJECT_ENVIRONMENT_GROUP, &self.name)?;
        writer.field(sf_type::DESCRIPTOR, category::OBJECT_AREA, &area.descriptor_data())?;
        writer.field(sf_type::POSITION, category::OBJECT_AREA, &area.position_data()?)?;
        writer.field(sf_type::DESCRIPTOR, category::GRAPHICS, &Self::data_descriptor(&area))?;
        writer.named(sf_type::END, category::OBJECT_ENVIRONMENT_GROUP, &self.name)?;
        for segment in self.segments(writer.max_data())? {
            writer.field(sf_type::DATA, category::GRAPHICS, &segment)?;
        }
        log::trace!("graphics object {} written ({} orders)", self.name, self.orders.len());
        writer.named(sf_type::END, category::GRAPHICS, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::structured_field::MAX_DATA_LENGTH;

    fn area() -> ObjectArea {
        ObjectArea {
            x: 0,
            y: 0,
            width: 1000,
            height: 500,
            rotation: 0,
            x_resolution: 240,
            y_resolution: 240,
        }
    }

    #[test]
    fn test_order_encoding() {
        let mut gra = GraphicsObject::new("GRA00001".into());
        gra.set_current_position(1, 2);
        gra.add_box(0, 0, 10, 20);
        gra.set_arc_parameters(5, 0, 0, 3);
        gra.add_full_arc(10, 10, 1.5);
        gra.begin_area(true);
        gra.end_area();
        gra.set_line_width(2);
        gra.set_line_type(LineType::Dotted);
        gra.set_color(&Color::from_rgb8(255, 0, 0));
        let orders = gra.orders();
        assert_eq!(orders[0], vec![0x21, 4, 0, 1, 0, 2]);
        assert_eq!(orders[1], vec![0xC0, 0x0A, 0x20, 0, 0, 0, 0, 0, 0, 10, 0, 20]);
        assert_eq!(orders[2], vec![0x22, 8, 0, 5, 0, 0, 0, 0, 0, 3]);
        assert_eq!(orders[3], vec![0xC7, 6, 0, 10, 0, 10, 1, 128]);
        assert_eq!(orders[4], vec![0x68, 0xC0]);
        assert_eq!(orders[5], vec![0x60, 0x00]);
        assert_eq!(orders[6], vec![0x19, 2]);
        assert_eq!(orders[7], vec![0x18, 1]);
        assert_eq!(orders[8], vec![0xB2, 13, 0, 1, 0, 0, 0, 0, 8, 8, 8, 0, 255, 0, 0]);
    }

    #[test]
    fn test_line_at_current_position() {
        let mut gra = GraphicsObject::new("GRA00001".into());
        gra.add_line(&[(3, 4)], true);
        gra.add_line(&[(0, 0), (3, 4)], false);
        assert_eq!(gra.orders()[0], vec![0x81, 4, 0, 3, 0, 4]);
        assert_eq!(gra.orders()[1][0], 0xC1);
    }

    #[test]
    fn test_long_polyline_split() {
        let mut gra = GraphicsObject::new("GRA00001".into());
        let points: Vec<(i32, i32)> = (0..100).map(|i| (i, i)).collect();
        gra.add_line(&points, false);
        assert_eq!(gra.orders().len(), 2);
        assert_eq!(gra.orders()[0][0], GLINE);
        assert_eq!(gra.orders()[1][0], GCLINE);
        assert!(gra.orders().iter().all(|o| o.len() <= 255));
    }

    #[test]
    fn test_segments_chain() {
        let mut gra = GraphicsObject::new("GRA00001".into());
        for i in 0..10 {
            gra.set_current_position(i, i);
        }
        let segments = gra.segments(SEGMENT_HEADER_LENGTH + 24).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(&segments[0][..2], &[0x70, 0x0C]);
        assert_eq!(segments[0][7], 0x00);
        assert_eq!(segments[1][7], 0x10);
        assert_eq!(&segments[1][10..14], &[0, 0, 0, 1]);
        assert_eq!(&segments[0][8..10], &[0, 24]);
    }

    #[test]
    fn test_position_data_length() {
        let data = area().position_data().unwrap();
        assert_eq!(data.len(), 24);
        assert_eq!(data[1] as usize, data.len() - 1);
    }

    #[test]
    fn test_write_requires_view_port() {
        let gra = GraphicsObject::new("GRA00001".into());
        let mut out = Vec::new();
        let mut writer = StructuredFieldWriter::new(&mut out, MAX_DATA_LENGTH);
        assert!(matches!(gra.write_to(&mut writer), Err(Error::IllegalState(_))));
    }

    #[test]
    fn test_write_fields() {
        let mut gra = GraphicsObject::new("GRA00001".into());
        gra.set_view_port(area()).unwrap();
        gra.set_current_position(0, 0);
        let mut out = Vec::new();
        let mut writer = StructuredFieldWriter::new(&mut out, MAX_DATA_LENGTH);
        gra.write_to(&mut writer).unwrap();
        // BGR BOG OBD OBP GDD EOG GAD EGR
        assert_eq!(writer.fields_written(), 8);
        assert_eq!(&out[3..6], &[0xD3, 0xA8, 0xBB]);
    }
}
