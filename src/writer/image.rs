//! IM image objects used for shaded areas.
//!
//! A shading is a 64×8 bilevel cell filled with an ordered-dither pattern of
//! the colour's grey level and replicated over the target area.

use super::structured_field::{category, orientation, push_i24, sf_type, Streamable, StructuredFieldWriter};
use crate::elements::Color;
use crate::error::Result;

/// Cell width in pixels.
pub const CELL_WIDTH: u16 = 64;
/// Cell height in pixels.
pub const CELL_HEIGHT: u16 = 8;
/// Number of grey levels above black.
pub const GREY_LEVELS: u8 = 16;

const BAYER: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// Grey level of a colour: 0 (black) to 16 (white).
pub fn grey_level(color: &Color) -> u8 {
    (color.luminance().clamp(0.0, 1.0) * GREY_LEVELS as f32).round() as u8
}

/// Dithered 64×8 cell, one bit per pixel, set bits are inked.
pub fn dither_cell(level: u8) -> Vec<u8> {
    let bytes_per_row = CELL_WIDTH as usize / 8;
    let mut cell = vec![0u8; bytes_per_row * CELL_HEIGHT as usize];
    for row in 0..CELL_HEIGHT as usize {
        for col in 0..CELL_WIDTH as usize {
            if BAYER[row % 4][col % 4] >= level {
                cell[row * bytes_per_row + col / 8] |= 0x80 >> (col % 8);
            }
        }
    }
    cell
}

/// Image cell position and fill area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    /// Cell x offset
    pub x: i32,
    /// Cell y offset
    pub y: i32,
    /// Fill width
    pub fill_width: i32,
    /// Fill height
    pub fill_height: i32,
}

impl CellPosition {
    /// Map an unrotated area onto a page of the given size and rotation.
    pub fn rotated(
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        rotation: i32,
        page_width: i32,
        page_height: i32,
    ) -> Self {
        match rotation.rem_euclid(360) {
            90 => Self {
                x: page_width - y - height,
                y: x,
                fill_width: height,
                fill_height: width,
            },
            180 => Self {
                x: page_width - x - width,
                y: page_height - y - height,
                fill_width: width,
                fill_height: height,
            },
            270 => Self {
                x: y,
                y: page_height - x - width,
                fill_width: height,
                fill_height: width,
            },
            _ => Self {
                x,
                y,
                fill_width: width,
                fill_height: height,
            },
        }
    }

    fn data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(12);
        for v in [
            self.x,
            self.y,
            CELL_WIDTH as i32,
            CELL_HEIGHT as i32,
            self.fill_width,
            self.fill_height,
        ] {
            data.extend_from_slice(&(v.clamp(0, u16::MAX as i32) as u16).to_be_bytes());
        }
        data
    }
}

/// An IM image object.
#[derive(Debug, Clone)]
pub struct ImageObject {
    name: String,
    rotation: i32,
    x_resolution: u16,
    y_resolution: u16,
    cell: Option<CellPosition>,
    raster: Vec<u8>,
}

impl ImageObject {
    /// Create an empty image object.
    pub fn new(name: String) -> Self {
        Self {
            name,
            rotation: 0,
            x_resolution: 240,
            y_resolution: 240,
            cell: None,
            raster: Vec::new(),
        }
    }

    /// Object name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Make this object a shading of `color` over the given cell position.
    pub fn set_shading(
        &mut self,
        cell: CellPosition,
        color: &Color,
        rotation: i32,
        x_resolution: u16,
        y_resolution: u16,
    ) -> Result<()> {
        orientation(rotation)?;
        self.rotation = rotation;
        self.x_resolution = x_resolution;
        self.y_resolution = y_resolution;
        self.raster = dither_cell(grey_level(color));
        self.cell = Some(cell);
        Ok(())
    }

    /// Cell placement, if shading was set.
    pub fn cell(&self) -> Option<&CellPosition> {
        self.cell.as_ref()
    }

    /// Raster data.
    pub fn raster(&self) -> &[u8] {
        &self.raster
    }

    fn output_control(&self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(24);
        push_i24(&mut data, 0);
        push_i24(&mut data, 0);
        data.extend_from_slice(&orientation(self.rotation)?);
        data.extend_from_slice(&orientation(self.rotation + 90)?);
        data.extend_from_slice(&[0; 8]);
        // x and y mapping: position and trim
        data.extend_from_slice(&[0x03, 0xE8, 0x03, 0xE8, 0xFF, 0xFF]);
        Ok(data)
    }

    fn input_descriptor(&self) -> Vec<u8> {
        let mut data = vec![0x00, 0x00];
        data.extend_from_slice(&self.x_resolution.saturating_mul(10).to_be_bytes());
        data.extend_from_slice(&self.y_resolution.saturating_mul(10).to_be_bytes());
        data.extend_from_slice(&CELL_WIDTH.to_be_bytes());
        data.extend_from_slice(&CELL_HEIGHT.to_be_bytes());
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF]);
        data
    }
}

impl Streamable for ImageObject {
    fn write_to(&self, writer: &mut StructuredFieldWriter<'_>) -> Result<()> {
        writer.named(sf_type::BEGIN, category::IM_IMAGE, &self.name)?;
        writer.field(sf_type::CONTROL, category::IM_IMAGE, &self.output_control()?)?;
        writer.field(sf_type::DESCRIPTOR, category::IM_IMAGE, &self.input_descriptor())?;
        if let Some(cell) = &self.cell {
            writer.field(sf_type::POSITION, category::IM_IMAGE, &cell.data())?;
        }
        if !self.raster.is_empty() {
            writer.data_fields(sf_type::DATA, category::IM_IMAGE, &self.raster)?;
        }
        writer.named(sf_type::END, category::IM_IMAGE, &self.name)
    }
}
