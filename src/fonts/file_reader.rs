//! Big-endian cursor over an in-memory font file.
//!
//! TrueType data is read sequentially (table directory, then each table in
//! dependency order) but the subsetter also needs random access and
//! positional writes so that composite glyph pointers can be rewritten in a
//! working copy of the font.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

/// Sequential / random-access reader over a fixed byte buffer.
#[derive(Debug, Clone)]
pub struct FontFileReader {
    data: Vec<u8>,
    position: usize,
}

impl FontFileReader {
    /// Wrap a buffer, positioned at its first byte.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    /// Current read position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whole underlying buffer.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the reader and return the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Move to an absolute offset. Seeking to the end of the buffer is allowed.
    pub fn seek_set(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(Error::OutOfRange {
                offset,
                len: self.data.len(),
            });
        }
        self.position = offset;
        Ok(())
    }

    /// Advance the position by `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        let target = self.position.checked_add(count).ok_or(Error::OutOfRange {
            offset: usize::MAX,
            len: self.data.len(),
        })?;
        self.seek_set(target)
    }

    fn take(&mut self, needed: usize) -> Result<&[u8]> {
        let end = match self.position.checked_add(needed) {
            Some(end) if end <= self.data.len() => end,
            _ => {
                return Err(Error::EndOfBuffer {
                    position: self.position,
                    needed,
                    len: self.data.len(),
                })
            },
        };
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    /// Read an unsigned byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut slice = self.take(1)?;
        Ok(slice.read_u8()?)
    }

    /// Read a signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        let mut slice = self.take(1)?;
        Ok(slice.read_i8()?)
    }

    /// Read a big-endian `uint16`.
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut slice = self.take(2)?;
        Ok(slice.read_u16::<BigEndian>()?)
    }

    /// Read a big-endian `int16`.
    pub fn read_i16(&mut self) -> Result<i16> {
        let mut slice = self.take(2)?;
        Ok(slice.read_i16::<BigEndian>()?)
    }

    /// Read a big-endian `uint32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut slice = self.take(4)?;
        Ok(slice.read_u32::<BigEndian>()?)
    }

    /// Read a big-endian `int32`.
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut slice = self.take(4)?;
        Ok(slice.read_i32::<BigEndian>()?)
    }

    /// Read a 16.16 fixed-point number.
    pub fn read_fixed(&mut self) -> Result<f32> {
        Ok(self.read_i32()? as f32 / 65536.0)
    }

    /// Read a `uint16` at an absolute offset without moving the cursor.
    pub fn read_u16_at(&self, offset: usize) -> Result<u16> {
        self.check_range(offset, 2)?;
        Ok(BigEndian::read_u16(&self.data[offset..]))
    }

    /// Read an `int16` at an absolute offset without moving the cursor.
    pub fn read_i16_at(&self, offset: usize) -> Result<i16> {
        self.check_range(offset, 2)?;
        Ok(BigEndian::read_i16(&self.data[offset..]))
    }

    /// Read a `uint32` at an absolute offset without moving the cursor.
    pub fn read_u32_at(&self, offset: usize) -> Result<u32> {
        self.check_range(offset, 4)?;
        Ok(BigEndian::read_u32(&self.data[offset..]))
    }

    /// Read a fixed-length string.
    ///
    /// The bytes are decoded as ISO-8859-1 unless the first byte is `0x00`,
    /// in which case UTF-16BE is assumed.
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        let raw = self.take(len)?;
        Ok(decode_heuristic(raw))
    }

    /// Read a NUL-terminated string; the terminator is consumed.
    pub fn read_string_nul_terminated(&mut self) -> Result<String> {
        let start = self.position;
        let end = self.data[start..]
            .iter()
            .position(|&b| b == 0)
            .map(|p| start + p)
            .ok_or(Error::EndOfBuffer {
                position: start,
                needed: self.data.len() - start + 1,
                len: self.data.len(),
            })?;
        let text = decode_heuristic(&self.data[start..end]);
        self.position = end + 1;
        Ok(text)
    }

    /// Read a fixed-length UTF-16BE string (name records on platform 3).
    pub fn read_string_utf16(&mut self, len: usize) -> Result<String> {
        let raw = self.take(len)?;
        Ok(decode_utf16be(raw))
    }

    /// Overwrite a `uint16` at an absolute offset.
    pub fn write_u16_at(&mut self, offset: usize, value: u16) -> Result<()> {
        self.check_range(offset, 2)?;
        BigEndian::write_u16(&mut self.data[offset..], value);
        Ok(())
    }

    /// Overwrite a `uint32` at an absolute offset.
    pub fn write_u32_at(&mut self, offset: usize, value: u32) -> Result<()> {
        self.check_range(offset, 4)?;
        BigEndian::write_u32(&mut self.data[offset..], value);
        Ok(())
    }

    /// Copy `length` bytes starting at `offset`.
    pub fn get_bytes(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        self.check_range(offset, length)?;
        Ok(self.data[offset..offset + length].to_vec())
    }

    fn check_range(&self, offset: usize, length: usize) -> Result<()> {
        match offset.checked_add(length) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(Error::OutOfRange {
                offset: offset.saturating_add(length),
                len: self.data.len(),
            }),
        }
    }
}

fn decode_heuristic(raw: &[u8]) -> String {
    if raw.first() == Some(&0) {
        decode_utf16be(raw)
    } else {
        raw.iter().map(|&b| b as char).collect()
    }
}

fn decode_utf16be(raw: &[u8]) -> String {
    let units: Vec<u16> = raw.chunks_exact(2).map(BigEndian::read_u16).collect();
    String::from_utf16_lossy(&units)
}
