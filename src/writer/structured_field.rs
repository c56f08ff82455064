//! MO:DCA structured field encoding.
//!
//! Every record in the data stream has the same introducer:
//!
//! ```text
//! 0x5A | length (2) | D3 | type | category | flags | reserved (2) | data
//! ```
//!
//! The length counts everything after the `0x5A` carriage control byte,
//! i.e. 8 bytes of introducer plus the data.

use crate::error::{Error, Result};
use crate::fonts::encoding::encode_cp500;
use std::io::Write;

/// Carriage control character preceding every structured field.
pub const CARRIAGE_CONTROL: u8 = 0x5A;
/// Length of the introducer counted by the length field.
pub const INTRODUCER_LENGTH: usize = 8;
/// Largest data length one structured field can carry.
pub const MAX_DATA_LENGTH: usize = 32_759;
/// Length of object names.
pub const NAME_LENGTH: usize = 8;

/// Structured field type codes (second identifier byte).
pub mod sf_type {
    /// Attribute
    pub const ATTRIBUTE: u8 = 0xA0;
    /// Copy count
    pub const COPY_COUNT: u8 = 0xA2;
    /// Descriptor
    pub const DESCRIPTOR: u8 = 0xA6;
    /// Control
    pub const CONTROL: u8 = 0xA7;
    /// Begin
    pub const BEGIN: u8 = 0xA8;
    /// End
    pub const END: u8 = 0xA9;
    /// Map
    pub const MAP: u8 = 0xAB;
    /// Position
    pub const POSITION: u8 = 0xAC;
    /// Process
    pub const PROCESS: u8 = 0xAD;
    /// Include
    pub const INCLUDE: u8 = 0xAF;
    /// Migration
    pub const MIGRATION: u8 = 0xB1;
    /// Data
    pub const DATA: u8 = 0xEE;
}

/// Structured field category codes (third identifier byte).
pub mod category {
    /// Page segment
    pub const PAGE_SEGMENT: u8 = 0x5F;
    /// Object area
    pub const OBJECT_AREA: u8 = 0x6B;
    /// IM image
    pub const IM_IMAGE: u8 = 0x7B;
    /// Coded font
    pub const CODED_FONT: u8 = 0x8A;
    /// Process element
    pub const PROCESS_ELEMENT: u8 = 0x90;
    /// Object container
    pub const OBJECT_CONTAINER: u8 = 0x92;
    /// Presentation text
    pub const PRESENTATION_TEXT: u8 = 0x9B;
    /// Document
    pub const DOCUMENT: u8 = 0xA8;
    /// Page group
    pub const PAGE_GROUP: u8 = 0xAD;
    /// Page
    pub const PAGE: u8 = 0xAF;
    /// Graphics
    pub const GRAPHICS: u8 = 0xBB;
    /// Resource group
    pub const RESOURCE_GROUP: u8 = 0xC6;
    /// Resource
    pub const RESOURCE: u8 = 0xCE;
    /// Object environment group
    pub const OBJECT_ENVIRONMENT_GROUP: u8 = 0xC7;
    /// Active environment group
    pub const ACTIVE_ENVIRONMENT_GROUP: u8 = 0xC9;
    /// Medium map
    pub const MEDIUM_MAP: u8 = 0xCC;
    /// Page overlay
    pub const PAGE_OVERLAY: u8 = 0xD8;
    /// Overlay
    pub const OVERLAY: u8 = 0xDF;
    /// No operation
    pub const NO_OPERATION: u8 = 0xEE;
}

/// One structured field held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredField {
    /// Type code
    pub type_code: u8,
    /// Category code
    pub category: u8,
    /// Flag byte
    pub flags: u8,
    /// Field data
    pub data: Vec<u8>,
}

impl StructuredField {
    /// A field with no flags.
    pub fn new(type_code: u8, category: u8, data: Vec<u8>) -> Self {
        Self {
            type_code,
            category,
            flags: 0,
            data,
        }
    }

    /// Begin/end fields carry just the object name.
    pub fn named(type_code: u8, category: u8, name: &str) -> Self {
        Self::new(type_code, category, encode_name(name).to_vec())
    }

    /// The three-byte identifier `D3 type category`.
    pub fn identifier(&self) -> [u8; 3] {
        [0xD3, self.type_code, self.category]
    }

    /// Encode introducer and data.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.data.len() > MAX_DATA_LENGTH {
            return Err(Error::InvalidArgument(format!(
                "structured field {:02X?} carries {} bytes, maximum is {}",
                self.identifier(),
                self.data.len(),
                MAX_DATA_LENGTH
            )));
        }
        let length = (INTRODUCER_LENGTH + self.data.len()) as u16;
        let mut bytes = Vec::with_capacity(1 + length as usize);
        bytes.push(CARRIAGE_CONTROL);
        bytes.extend_from_slice(&length.to_be_bytes());
        bytes.extend_from_slice(&self.identifier());
        bytes.push(self.flags);
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&self.data);
        Ok(bytes)
    }
}

/// Writes structured fields to an output sink.
pub struct StructuredFieldWriter<'a> {
    out: &'a mut dyn Write,
    max_data: usize,
    fields_written: usize,
}

impl<'a> StructuredFieldWriter<'a> {
    /// Wrap a sink; `max_data` is clamped to [`MAX_DATA_LENGTH`].
    pub fn new(out: &'a mut dyn Write, max_data: usize) -> Self {
        Self {
            out,
            max_data: max_data.clamp(1, MAX_DATA_LENGTH),
            fields_written: 0,
        }
    }

    /// Largest data length of a single field.
    pub fn max_data(&self) -> usize {
        self.max_data
    }

    /// Number of fields written so far.
    pub fn fields_written(&self) -> usize {
        self.fields_written
    }

    /// Write one field.
    pub fn write_field(&mut self, field: &StructuredField) -> Result<()> {
        if field.data.len() > self.max_data {
            return Err(Error::InvalidArgument(format!(
                "structured field {:02X?} carries {} bytes, limit is {}",
                field.identifier(),
                field.data.len(),
                self.max_data
            )));
        }
        self.out.write_all(&field.encode()?)?;
        self.fields_written += 1;
        Ok(())
    }

    /// Write a field built from its parts.
    pub fn field(&mut self, type_code: u8, category: u8, data: &[u8]) -> Result<()> {
        self.write_field(&StructuredField::new(type_code, category, data.to_vec()))
    }

    /// Write a begin or end field carrying an object name.
    pub fn named(&mut self, type_code: u8, category: u8, name: &str) -> Result<()> {
        self.write_field(&StructuredField::named(type_code, category, name))
    }

    /// Write data, split over as many consecutive fields as needed.
    pub fn data_fields(&mut self, type_code: u8, category: u8, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return self.field(type_code, category, data);
        }
        for chunk in data.chunks(self.max_data) {
            self.field(type_code, category, chunk)?;
        }
        Ok(())
    }
}

/// Something that serializes itself as structured fields.
pub trait Streamable {
    /// Write all fields of this object.
    fn write_to(&self, writer: &mut StructuredFieldWriter<'_>) -> Result<()>;
}

impl Streamable for StructuredField {
    fn write_to(&self, writer: &mut StructuredFieldWriter<'_>) -> Result<()> {
        writer.write_field(self)
    }
}

/// Encode an object name as 8 EBCDIC bytes, blank padded or truncated.
pub fn encode_name(name: &str) -> [u8; NAME_LENGTH] {
    let mut bytes = [0x40u8; NAME_LENGTH];
    for (slot, b) in bytes.iter_mut().zip(encode_cp500(name)) {
        *slot = b;
    }
    bytes
}

/// Append a value as a 3-byte big-endian integer.
pub fn push_u24(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes()[1..]);
}

/// Append a signed value as a 3-byte two's complement integer.
pub fn push_i24(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_be_bytes()[1..]);
}

/// Two-byte orientation code for a rotation in degrees.
pub fn orientation(rotation: i32) -> Result<[u8; 2]> {
    match rotation.rem_euclid(360) {
        0 => Ok([0x00, 0x00]),
        90 => Ok([0x2D, 0x00]),
        180 => Ok([0x5A, 0x00]),
        270 => Ok([0x87, 0x00]),
        other => Err(Error::InvalidArgument(format!(
            "rotation must be 0, 90, 180 or 270, got {}",
            other
        ))),
    }
}

/// Triplet builders shared by several fields.
pub mod triplet {
    use super::{encode_name, push_u24};

    /// Fully Qualified Name type: Begin Resource Object Reference.
    pub const FQN_BEGIN_RESOURCE_OBJECT_REF: u8 = 0x84;
    /// Fully Qualified Name type: Code Page Name Reference.
    pub const FQN_CODE_PAGE_NAME_REF: u8 = 0x85;
    /// Fully Qualified Name type: Font Character Set Name Reference.
    pub const FQN_FONT_CHARSET_NAME_REF: u8 = 0x86;
    /// Fully Qualified Name type: Attribute Name.
    pub const FQN_ATTRIBUTE_NAME: u8 = 0x0B;

    /// Resource Local Identifier type: page overlay.
    pub const RLI_PAGE_OVERLAY: u8 = 0x02;
    /// Resource Local Identifier type: coded font.
    pub const RLI_CODED_FONT: u8 = 0x05;

    /// Fully Qualified Name (0x02) with an 8-character name.
    pub fn fully_qualified_name(fqn_type: u8, name: &str) -> Vec<u8> {
        let mut t = vec![12, 0x02, fqn_type, 0x00];
        t.extend_from_slice(&encode_name(name));
        t
    }

    /// Fully Qualified Name (0x02) with a variable length character name.
    pub fn fully_qualified_text(fqn_type: u8, text: &[u8]) -> Vec<u8> {
        let mut t = vec![(4 + text.len()) as u8, 0x02, fqn_type, 0x00];
        t.extend_from_slice(text);
        t
    }

    /// Resource Local Identifier (0x24).
    pub fn resource_local_id(rli_type: u8, id: u8) -> Vec<u8> {
        vec![4, 0x24, rli_type, id]
    }

    /// Descriptor Position (0x43).
    pub fn descriptor_position(position_id: u8) -> Vec<u8> {
        vec![3, 0x43, position_id]
    }

    /// Measurement Units (0x4B): units per ten inches on both axes.
    pub fn measurement_units(x_resolution: u16, y_resolution: u16) -> Vec<u8> {
        let mut t = vec![8, 0x4B, 0x00, 0x00];
        t.extend_from_slice(&(x_resolution.saturating_mul(10)).to_be_bytes());
        t.extend_from_slice(&(y_resolution.saturating_mul(10)).to_be_bytes());
        t
    }

    /// Object Area Size (0x4C).
    pub fn object_area_size(width: u32, height: u32) -> Vec<u8> {
        let mut t = vec![9, 0x4C, 0x02];
        push_u24(&mut t, width);
        push_u24(&mut t, height);
        t
    }

    /// Attribute Value (0x36).
    pub fn attribute_value(value: &[u8]) -> Vec<u8> {
        let mut t = vec![(4 + value.len()) as u8, 0x36, 0x00, 0x00];
        t.extend_from_slice(value);
        t
    }

    /// Attribute Qualifier (0x80): sequence number and level.
    pub fn attribute_qualifier(sequence: u32, level: u32) -> Vec<u8> {
        let mut t = vec![10, 0x80];
        t.extend_from_slice(&sequence.to_be_bytes());
        t.extend_from_slice(&level.to_be_bytes());
        t
    }

    /// Font Horizontal Scale Factor (0x5D) in 1/20 point.
    pub fn font_horizontal_scale(point_size: f32) -> Vec<u8> {
        let scale = (point_size * 20.0).round().clamp(0.0, u16::MAX as f32) as u16;
        let mut t = vec![4, 0x5D];
        t.extend_from_slice(&scale.to_be_bytes());
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_introducer() {
        let field = StructuredField::named(sf_type::BEGIN, category::PAGE, "PGN00001");
        let bytes = field.encode().unwrap();
        assert_eq!(bytes[0], 0x5A);
        assert_eq!(&bytes[1..3], &[0x00, 0x10]);
        assert_eq!(&bytes[3..6], &[0xD3, 0xA8, 0xAF]);
        assert_eq!(&bytes[6..9], &[0, 0, 0]);
        assert_eq!(&bytes[9..], &[0xD7, 0xC7, 0xD5, 0xF0, 0xF0, 0xF0, 0xF0, 0xF1]);
    }

    #[test]
    fn test_data_fields_split() {
        let mut out = Vec::new();
        let mut writer = StructuredFieldWriter::new(&mut out, 10);
        writer
            .data_fields(sf_type::DATA, category::OBJECT_CONTAINER, &[7u8; 25])
            .unwrap();
        assert_eq!(writer.fields_written(), 3);
        // 10 + 10 + 5 data bytes, 9 framing bytes each
        assert_eq!(out.len(), 25 + 3 * 9);
        assert_eq!(&out[1..3], &[0x00, 18]);
    }

    #[test]
    fn test_oversized_field_rejected() {
        let mut out = Vec::new();
        let mut writer = StructuredFieldWriter::new(&mut out, 4);
        let err = writer.field(sf_type::DESCRIPTOR, category::PAGE, &[0; 5]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_max_data_clamped() {
        let mut out = Vec::new();
        let writer = StructuredFieldWriter::new(&mut out, 100_000);
        assert_eq!(writer.max_data(), MAX_DATA_LENGTH);
    }

    #[test]
    fn test_encode_name_pads_with_blanks() {
        assert_eq!(encode_name("RG1"), [0xD9, 0xC7, 0xF1, 0x40, 0x40, 0x40, 0x40, 0x40]);
        assert_eq!(encode_name("ABCDEFGHIJ").len(), 8);
    }

    #[test]
    fn test_orientation_codes() {
        assert_eq!(orientation(0).unwrap(), [0x00, 0x00]);
        assert_eq!(orientation(90).unwrap(), [0x2D, 0x00]);
        assert_eq!(orientation(180).unwrap(), [0x5A, 0x00]);
        assert_eq!(orientation(270).unwrap(), [0x87, 0x00]);
        assert_eq!(orientation(-90).unwrap(), [0x87, 0x00]);
        assert!(orientation(45).is_err());
    }

    #[test]
    fn test_triplets() {
        assert_eq!(triplet::resource_local_id(triplet::RLI_CODED_FONT, 3), vec![4, 0x24, 5, 3]);
        assert_eq!(triplet::fully_qualified_name(0x85, "T1V10500").len(), 12);
        assert_eq!(triplet::measurement_units(240, 240), vec![8, 0x4B, 0, 0, 0x09, 0x60, 0x09, 0x60]);
        assert_eq!(triplet::object_area_size(1, 2), vec![9, 0x4C, 2, 0, 0, 1, 0, 0, 2]);
    }
}
