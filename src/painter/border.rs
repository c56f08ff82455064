//! Border painting.
//!
//! One border edge becomes one or more rules: two for `Double`, a row of
//! dashes or dots, three shaded bands for `Groove`/`Ridge`.

use super::{round_half_up, PaintingState};
use crate::elements::{BorderPaintingInfo, BorderStyle, LineDataInfo};
use crate::error::Result;
use crate::writer::DataStream;
use std::io::Write;

/// Lightening applied to the outer and inner bands of groove and ridge.
const BEVEL_FACTOR: f32 = 0.4;

/// Paints border edges as presentation text rules.
#[derive(Debug, Clone)]
pub struct BorderPainter {
    state: PaintingState,
}

impl BorderPainter {
    /// Create a painter for a painting state.
    pub fn new(state: PaintingState) -> Self {
        Self { state }
    }

    /// Painting state.
    pub fn state(&self) -> &PaintingState {
        &self.state
    }

    /// Paint `info` on the active page of `stream`.
    pub fn paint<W: Write>(&self, info: &BorderPaintingInfo, stream: &mut DataStream<W>) -> Result<()> {
        let page = stream.current_page_mut()?;
        let (page_width, page_height) = (page.width() as f32, page.height() as f32);
        for line in self.lines(info, page_width, page_height) {
            stream.create_line(&line)?;
        }
        Ok(())
    }

    /// The rules for `info` on a page of the given size in device units.
    pub fn lines(&self, info: &BorderPaintingInfo, page_width: f32, page_height: f32) -> Vec<LineDataInfo> {
        if info.width() < 0.0 || info.height() < 0.0 {
            log::error!("Negative extent received. Border won't be painted.");
            return Vec::new();
        }

        let conv = self.state.unit_converter();
        let tx = self.state.transform.translate_x();
        let ty = self.state.transform.translate_y();
        let mut x1 = conv.pt_to_units(info.x1);
        let mut y1 = conv.pt_to_units(info.y1);
        let mut x2 = conv.pt_to_units(info.x2);
        let mut y2 = conv.pt_to_units(info.y2);

        match self.state.rotation {
            90 => {
                x1 += ty;
                y1 += page_width - tx;
                x2 += ty;
                y2 += page_width - tx;
            },
            180 => {
                x1 += page_width - tx;
                y1 += page_height - ty;
                x2 += page_width - tx;
                y2 += page_height - ty;
            },
            270 => {
                // x1 is replaced, not offset
                x1 = page_height - ty;
                y1 += tx;
                x2 += x1;
                y2 += tx;
            },
            _ => {
                x1 += tx;
                y1 += ty;
                x2 += tx;
                y2 += ty;
            },
        }

        let thickness = if info.is_horizontal { y2 - y1 } else { x2 - x1 };
        let base = LineDataInfo {
            x1: round_half_up(x1),
            y1: round_half_up(y1),
            x2: round_half_up(x1),
            y2: round_half_up(y1),
            thickness: round_half_up(thickness),
            color: info.color,
            rotation: self.state.rotation,
        };
        let end_x = round_half_up(x2);
        let end_y = round_half_up(y2);

        let mut lines = Vec::new();
        match info.style {
            BorderStyle::None | BorderStyle::Hidden => {},
            BorderStyle::Double => {
                let thickness3 = (thickness / 3.0).floor() as i32;
                let distance = thickness3 * 2;
                let mut first = LineDataInfo { thickness: thickness3, ..base.clone() };
                if info.is_horizontal {
                    first.x2 = end_x;
                    first.y2 = first.y1;
                    let mut second = first.clone();
                    second.y1 += distance;
                    second.y2 += distance;
                    lines.push(first);
                    lines.push(second);
                } else {
                    first.x2 = first.x1;
                    first.y2 = end_y;
                    let mut second = first.clone();
                    second.x1 += distance;
                    second.x2 += distance;
                    lines.push(first);
                    lines.push(second);
                }
            },
            BorderStyle::Dashed => {
                let dash = base.thickness * 3;
                dashes(&base, dash, 2 * dash, info.is_horizontal, end_x, end_y, &mut lines);
            },
            BorderStyle::Dotted => {
                let dot = base.thickness;
                dashes(&base, dot, 3 * dot, info.is_horizontal, end_x, end_y, &mut lines);
            },
            BorderStyle::Groove | BorderStyle::Ridge => {
                let factor = if info.style == BorderStyle::Groove {
                    BEVEL_FACTOR
                } else {
                    -BEVEL_FACTOR
                };
                let h3 = (y2 - y1) / 3.0;
                let band = |y: f32, color| LineDataInfo {
                    x2: end_x,
                    y1: round_half_up(y),
                    y2: round_half_up(y),
                    thickness: round_half_up(h3),
                    color,
                    ..base.clone()
                };
                lines.push(band(y1, info.color.lighten(-factor)));
                lines.push(band(y1 + h3, info.color));
                lines.push(band(y1 + h3 + h3, info.color.lighten(factor)));
            },
            BorderStyle::Solid | BorderStyle::Inset | BorderStyle::Outset => {
                let mut line = base;
                if info.is_horizontal {
                    line.x2 = end_x;
                    line.y2 = line.y1;
                } else {
                    line.x2 = line.x1;
                    line.y2 = end_y;
                }
                lines.push(line);
            },
        }
        lines
    }
}

/// Repeated segments of `length` every `step` units until a segment would
/// reach the end of the edge.
fn dashes(
    base: &LineDataInfo,
    length: i32,
    step: i32,
    horizontal: bool,
    end_x: i32,
    end_y: i32,
    lines: &mut Vec<LineDataInfo>,
) {
    if length <= 0 {
        log::debug!("Border thickness rounds to zero, nothing to draw");
        return;
    }
    let mut line = base.clone();
    if horizontal {
        line.y2 = line.y1;
        while line.x1 + length < end_x {
            line.x2 = line.x1 + length;
            lines.push(line.clone());
            line.x1 += step;
        }
    } else {
        line.x2 = line.x1;
        while line.y1 + length < end_y {
            line.y2 = line.y1 + length;
            lines.push(line.clone());
            line.y1 += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Color;
    use crate::geometry::AffineTransform;

    fn painter(resolution: u16, rotation: i32) -> BorderPainter {
        BorderPainter::new(PaintingState::new(resolution).with_rotation(rotation))
    }

    #[test]
    fn test_solid_vertical() {
        let info = BorderPaintingInfo::new(10.0, 0.0, 12.0, 50.0, false, BorderStyle::Solid);
        let lines = painter(72, 0).lines(&info, 1000.0, 1000.0);
        assert_eq!(lines.len(), 1);
        assert_eq!((lines[0].x1, lines[0].y1, lines[0].x2, lines[0].y2), (10, 0, 10, 50));
        assert_eq!(lines[0].thickness, 2);
    }

    #[test]
    fn test_dotted_spacing() {
        let info = BorderPaintingInfo::new(0.0, 0.0, 100.0, 5.0, true, BorderStyle::Dotted);
        let lines = painter(72, 0).lines(&info, 1000.0, 1000.0);
        let starts: Vec<i32> = lines.iter().map(|l| l.x1).collect();
        assert_eq!(starts, (0..7).map(|i| i * 15).collect::<Vec<_>>());
        assert!(lines.iter().all(|l| l.x2 - l.x1 == 5));
    }

    #[test]
    fn test_groove_bands() {
        let color = Color::new(0.5, 0.5, 0.5);
        let info = BorderPaintingInfo::new(0.0, 0.0, 90.0, 9.0, true, BorderStyle::Groove)
            .with_color(color);
        let lines = painter(72, 0).lines(&info, 1000.0, 1000.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().map(|l| l.y1).collect::<Vec<_>>(), vec![0, 3, 6]);
        assert!(lines.iter().all(|l| l.thickness == 3 && l.x2 == 90));
        assert!(lines[0].color.r < color.r);
        assert_eq!(lines[1].color, color);
        assert!(lines[2].color.r > color.r);

        let ridge = BorderPaintingInfo { style: BorderStyle::Ridge, ..info };
        let lines = painter(72, 0).lines(&ridge, 1000.0, 1000.0);
        assert!(lines[0].color.r > color.r);
    }

    #[test]
    fn test_hidden_and_negative_extent() {
        let hidden = BorderPaintingInfo::new(0.0, 0.0, 10.0, 1.0, true, BorderStyle::Hidden);
        assert!(painter(72, 0).lines(&hidden, 100.0, 100.0).is_empty());
        let negative = BorderPaintingInfo::new(10.0, 0.0, 0.0, 1.0, true, BorderStyle::Solid);
        assert!(painter(72, 0).lines(&negative, 100.0, 100.0).is_empty());
    }

    #[test]
    fn test_rotation_offsets() {
        let info = BorderPaintingInfo::new(0.0, 0.0, 10.0, 2.0, true, BorderStyle::Solid);
        let state = PaintingState::new(72).with_transform(AffineTransform::translation(5.0, 7.0));

        let line = &BorderPainter::new(state.clone().with_rotation(90)).lines(&info, 100.0, 200.0)[0];
        assert_eq!((line.x1, line.y1, line.x2), (7, 95, 17));

        let line = &BorderPainter::new(state.clone().with_rotation(180)).lines(&info, 100.0, 200.0)[0];
        assert_eq!((line.x1, line.y1, line.x2), (95, 193, 105));

        // x2 is offset by the replaced x1
        let line = &BorderPainter::new(state.with_rotation(270)).lines(&info, 100.0, 200.0)[0];
        assert_eq!((line.x1, line.y1, line.x2), (193, 5, 203));
        assert_eq!(line.rotation, 270);
    }
}
