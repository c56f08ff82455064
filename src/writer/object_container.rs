//! Object containers carrying embedded font files.

use super::structured_field::{category, encode_name, sf_type, Streamable, StructuredFieldWriter};
use crate::error::Result;
use crate::fonts::encoding::encode_cp500;

/// Length of the object classification triplet.
const CLASSIFICATION_LENGTH: usize = 96;
/// Object class: time-invariant paginated presentation object.
const CLASS_TIME_INVARIANT: u8 = 0x41;
/// Structure flags: object data carried in OCD fields, no environment group.
const STRUCTURE_FLAGS: [u8; 2] = [0x60, 0x00];

/// Registered object types an object container can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// TrueType or OpenType font file
    TrueType,
    /// TrueType collection
    TrueTypeCollection,
}

impl ObjectType {
    /// Encoded registered object identifier.
    pub fn oid(&self) -> &'static [u8] {
        match self {
            ObjectType::TrueType => &[0x06, 0x07, 0x2B, 0x12, 0x00, 0x04, 0x01, 0x01, 0x33],
            ObjectType::TrueTypeCollection => &[0x06, 0x07, 0x2B, 0x12, 0x00, 0x04, 0x01, 0x01, 0x35],
        }
    }

    /// Type name written into the classification.
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectType::TrueType => "TrueType/OpenType Font",
            ObjectType::TrueTypeCollection => "TrueType/OpenType Font Collection",
        }
    }
}

/// An object container (BOC, OCD..., EOC).
#[derive(Debug, Clone)]
pub struct ObjectContainer {
    name: String,
    object_type: ObjectType,
    data: Vec<u8>,
}

impl ObjectContainer {
    /// Create an empty TrueType container.
    pub fn new(name: String) -> Self {
        Self {
            name,
            object_type: ObjectType::TrueType,
            data: Vec::new(),
        }
    }

    /// Set the object type.
    pub fn with_object_type(mut self, object_type: ObjectType) -> Self {
        self.object_type = object_type;
        self
    }

    /// Set the carried object bytes.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Container name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Object type.
    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// Carried object bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Object Classification triplet (0x10).
    pub fn classification(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(CLASSIFICATION_LENGTH);
        t.extend_from_slice(&[CLASSIFICATION_LENGTH as u8, 0x10, 0x00, CLASS_TIME_INVARIANT]);
        t.extend_from_slice(&[0x00, 0x00]);
        t.extend_from_slice(&STRUCTURE_FLAGS);
        t.extend(padded(self.object_type.oid(), 16, 0x00));
        t.extend(padded(&encode_cp500(self.object_type.type_name()), 32, 0x40));
        // object level, company name
        t.extend(std::iter::repeat(0x40).take(8 + 32));
        t
    }
}

fn padded(bytes: &[u8], len: usize, fill: u8) -> Vec<u8> {
    let mut out: Vec<u8> = bytes.iter().copied().take(len).collect();
    out.resize(len, fill);
    out
}

impl Streamable for ObjectContainer {
    fn write_to(&self, writer: &mut StructuredFieldWriter<'_>) -> Result<()> {
        let mut begin = encode_name(&self.name).to_vec();
        begin.extend_from_slice(&[0x00, 0x00]);
        begin.extend(self.classification());
        writer.field(sf_type::BEGIN, category::OBJECT_CONTAINER, &begin)?;
        writer.data_fields(sf_type::DATA, category::OBJECT_CONTAINER, &self.data)?;
        log::debug!("object container {} written ({} bytes)", self.name, self.data.len());
        writer.named(sf_type::END, category::OBJECT_CONTAINER, &self.name)
    }
}
