//! sfnt table directory and TrueType Collection headers.

use crate::error::Result;
use crate::fonts::file_reader::FontFileReader;
use std::collections::BTreeMap;

/// `0x00010000`: OpenType 1.0 / TrueType outlines.
pub const SFNT_VERSION_1_0: u32 = 0x0001_0000;
/// `OTTO`: OpenType with CFF outlines.
pub const SFNT_VERSION_OTTO: u32 = 0x4F54_544F;
/// `true`: Apple TrueType.
pub const SFNT_VERSION_TRUE: u32 = 0x7472_7565;
/// `typ1`: Apple Type 1 housed in an sfnt wrapper.
pub const SFNT_VERSION_TYP1: u32 = 0x7479_7031;
/// `ttcf`: TrueType Collection header tag.
pub const TTC_TAG: &[u8; 4] = b"ttcf";

/// Outline flavor announced by the sfnt version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFlavor {
    /// `glyf`/`loca` outlines
    TrueType,
    /// Compact Font Format outlines (`OTTO`)
    Cff,
}

/// One entry of the table directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Four-byte table tag
    pub tag: [u8; 4],
    /// Checksum recorded in the directory
    pub checksum: u32,
    /// Offset of the table from the beginning of the file
    pub offset: u32,
    /// Table length in bytes
    pub length: u32,
}

impl DirectoryEntry {
    /// Tag as a string (tags are ASCII by definition).
    pub fn tag_str(&self) -> String {
        self.tag.iter().map(|&b| b as char).collect()
    }

    fn read(reader: &mut FontFileReader) -> Result<Self> {
        let mut tag = [0u8; 4];
        for b in tag.iter_mut() {
            *b = reader.read_u8()?;
        }
        Ok(Self {
            tag,
            checksum: reader.read_u32()?,
            offset: reader.read_u32()?,
            length: reader.read_u32()?,
        })
    }
}

/// Parsed table directory keyed by tag.
#[derive(Debug, Clone)]
pub struct TableDirectory {
    /// Outline flavor from the sfnt version
    pub flavor: FontFlavor,
    /// Directory entries
    pub entries: BTreeMap<[u8; 4], DirectoryEntry>,
}

impl TableDirectory {
    /// Read the offset table and directory at the reader's current position.
    pub fn read(reader: &mut FontFileReader) -> Result<Self> {
        let version = reader.read_u32()?;
        let flavor = match version {
            SFNT_VERSION_1_0 => {
                log::debug!("sfnt version: OpenType 1.0");
                FontFlavor::TrueType
            },
            SFNT_VERSION_OTTO => {
                log::debug!("sfnt version: OpenType with CFF data");
                FontFlavor::Cff
            },
            SFNT_VERSION_TRUE => {
                log::debug!("sfnt version: Apple TrueType");
                FontFlavor::TrueType
            },
            SFNT_VERSION_TYP1 => {
                log::debug!("sfnt version: Apple Type 1 housed in sfnt wrapper");
                FontFlavor::TrueType
            },
            other => {
                log::debug!("Unknown sfnt version: {:#010x}", other);
                FontFlavor::TrueType
            },
        };

        let num_tables = reader.read_u16()?;
        // searchRange, entrySelector, rangeShift
        reader.skip(6)?;

        let mut entries = BTreeMap::new();
        for _ in 0..num_tables {
            let entry = DirectoryEntry::read(reader)?;
            log::trace!(
                "table {} offset={} length={}",
                entry.tag_str(),
                entry.offset,
                entry.length
            );
            entries.insert(entry.tag, entry);
        }

        Ok(Self { flavor, entries })
    }

    /// Look up an entry by tag.
    pub fn get(&self, tag: &[u8; 4]) -> Option<&DirectoryEntry> {
        self.entries.get(tag)
    }

    /// Whether a table is present.
    pub fn contains(&self, tag: &[u8; 4]) -> bool {
        self.entries.contains_key(tag)
    }
}

/// Offsets of the sub-font directories of a TrueType Collection.
///
/// The reader must be positioned just after the `ttcf` tag.
pub fn read_collection_offsets(reader: &mut FontFileReader) -> Result<Vec<u32>> {
    // major/minor version
    reader.skip(4)?;
    let num_fonts = reader.read_u32()?;
    let mut offsets = Vec::with_capacity(num_fonts.min(1024) as usize);
    for _ in 0..num_fonts {
        offsets.push(reader.read_u32()?);
    }
    log::info!("This is a TrueType collection file with {} fonts", num_fonts);
    Ok(offsets)
}

/// Standard table checksum: sum of big-endian `uint32` words, zero padded.
pub fn table_checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}
