//! Filled rectangles drawn as a single thick rule.

use super::{round_half_up, PaintingState};
use crate::elements::{LineDataInfo, RectanglePaintingInfo};
use crate::error::Result;
use crate::writer::DataStream;
use std::io::Write;

/// Paints filled rectangles in the current colour.
#[derive(Debug, Clone)]
pub struct RectanglePainter {
    state: PaintingState,
}

impl RectanglePainter {
    /// Create a painter for a painting state.
    pub fn new(state: PaintingState) -> Self {
        Self { state }
    }

    /// Paint `info` on the active page of `stream`.
    pub fn paint<W: Write>(&self, info: &RectanglePaintingInfo, stream: &mut DataStream<W>) -> Result<()> {
        let page = stream.current_page_mut()?;
        let line = self.line(info, page.width() as f32, page.height() as f32);
        stream.create_line(&line)
    }

    /// The rule covering `info` on a page of the given size in device units.
    pub fn line(&self, info: &RectanglePaintingInfo, page_width: f32, page_height: f32) -> LineDataInfo {
        let conv = self.state.unit_converter();
        let width = conv.pt_to_units(info.width);
        let height = conv.pt_to_units(info.height);
        let x = conv.pt_to_units(info.x);
        let y = conv.pt_to_units(info.y);
        let tx = self.state.transform.translate_x();
        let ty = self.state.transform.translate_y();

        let (x1, y1, x2) = match self.state.rotation {
            90 => (ty + x, page_width - tx - y, width + ty + x),
            180 => (
                page_width - (tx - x),
                page_height - (ty - y),
                page_width - (tx - x - width),
            ),
            270 => (
                page_height - (ty - x),
                tx + y,
                page_height - (ty - x - width),
            ),
            _ => (tx + x, ty + y, tx + x + width),
        };
        let y1 = round_half_up(y1);
        LineDataInfo {
            x1: round_half_up(x1),
            y1,
            x2: round_half_up(x2),
            y2: y1,
            thickness: round_half_up(height),
            color: self.state.color,
            rotation: self.state.rotation,
        }
    }
}
