//! Presentation text (PTOCA) objects.
//!
//! Text and rules are encoded as control sequences inside Presentation Text
//! Data fields. A chain starts with the `2BD3` escape; every sequence except
//! the last carries an odd (chained) function code.

use super::structured_field::{
    category, orientation, sf_type, Streamable, StructuredFieldWriter, MAX_DATA_LENGTH,
};
use crate::elements::{Color, LineDataInfo, TextDataInfo};
use crate::error::{Error, Result};

/// Control sequence prefix and class.
pub const ESCAPE: [u8; 2] = [0x2B, 0xD3];

/// Absolute Move Baseline
pub const AMB: u8 = 0xD2;
/// Absolute Move Inline
pub const AMI: u8 = 0xC6;
/// Relative Move Baseline
pub const RMB: u8 = 0xD4;
/// Relative Move Inline
pub const RMI: u8 = 0xC8;
/// Set Text Orientation
pub const STO: u8 = 0xF6;
/// Set Coded Font Local
pub const SCFL: u8 = 0xF0;
/// Set Extended Text Color
pub const SEC: u8 = 0x80;
/// Set Variable Space Character Increment
pub const SVI: u8 = 0xC4;
/// Set Intercharacter Adjustment
pub const SIA: u8 = 0xC2;
/// Transparent Data
pub const TRN: u8 = 0xDA;
/// Draw I-axis Rule
pub const DIR: u8 = 0xE4;
/// Draw B-axis Rule
pub const DBR: u8 = 0xE6;
/// No Operation
pub const NOP: u8 = 0xF8;

/// Longest transparent data run of one TRN sequence.
const MAX_TRN_LENGTH: usize = 253;

/// One control sequence before chaining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSequence {
    /// Unchained function code
    pub code: u8,
    /// Parameters
    pub params: Vec<u8>,
}

impl ControlSequence {
    fn new(code: u8, params: Vec<u8>) -> Self {
        Self { code, params }
    }

    fn encoded_len(&self) -> usize {
        2 + self.params.len()
    }

    fn encode_into(&self, buf: &mut Vec<u8>, chained: bool) {
        buf.push(self.encoded_len() as u8);
        buf.push(if chained { self.code | 1 } else { self.code });
        buf.extend_from_slice(&self.params);
    }
}

/// Collects control sequences and packs them into escape-led chains.
#[derive(Debug, Default, Clone)]
pub struct PtocaBuilder {
    sequences: Vec<ControlSequence>,
}

impl PtocaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, code: u8, params: Vec<u8>) -> &mut Self {
        self.sequences.push(ControlSequence::new(code, params));
        self
    }

    /// Absolute move inline.
    pub fn absolute_move_inline(&mut self, position: i32) -> Result<&mut Self> {
        let params = short(position, "inline position")?;
        Ok(self.push(AMI, params.to_vec()))
    }

    /// Absolute move baseline.
    pub fn absolute_move_baseline(&mut self, position: i32) -> Result<&mut Self> {
        let params = short(position, "baseline position")?;
        Ok(self.push(AMB, params.to_vec()))
    }

    /// Relative move inline.
    pub fn relative_move_inline(&mut self, increment: i32) -> Result<&mut Self> {
        let params = short(increment, "inline increment")?;
        Ok(self.push(RMI, params.to_vec()))
    }

    /// Relative move baseline.
    pub fn relative_move_baseline(&mut self, increment: i32) -> Result<&mut Self> {
        let params = short(increment, "baseline increment")?;
        Ok(self.push(RMB, params.to_vec()))
    }

    /// Set text orientation from a page rotation.
    pub fn set_text_orientation(&mut self, rotation: i32) -> Result<&mut Self> {
        let mut params = orientation(rotation)?.to_vec();
        params.extend_from_slice(&orientation(rotation + 90)?);
        Ok(self.push(STO, params))
    }

    /// Select the coded font with a local identifier.
    pub fn set_coded_font_local(&mut self, font_reference: u8) -> &mut Self {
        self.push(SCFL, vec![font_reference])
    }

    /// Set an RGB text color.
    pub fn set_extended_text_color(&mut self, color: &Color) -> &mut Self {
        let mut params = vec![0x00, 0x01, 0, 0, 0, 0, 8, 8, 8, 0];
        params.extend_from_slice(&color.to_rgb_bytes());
        self.push(SEC, params)
    }

    /// Set the variable space character increment.
    pub fn set_variable_space_increment(&mut self, increment: i32) -> Result<&mut Self> {
        let params = short(increment, "variable space increment")?;
        Ok(self.push(SVI, params.to_vec()))
    }

    /// Set the intercharacter adjustment; negative values set the direction byte.
    pub fn set_intercharacter_adjustment(&mut self, adjustment: i32) -> &mut Self {
        let mut params = (adjustment.unsigned_abs().min(u16::MAX as u32) as u16)
            .to_be_bytes()
            .to_vec();
        params.push(u8::from(adjustment < 0));
        self.push(SIA, params)
    }

    /// Transparent data, split into runs of at most 253 bytes that never
    /// break a `char_width`-byte character.
    pub fn transparent_data(&mut self, data: &[u8], char_width: usize) -> &mut Self {
        let run = MAX_TRN_LENGTH - MAX_TRN_LENGTH % char_width.max(1);
        for chunk in data.chunks(run) {
            self.push(TRN, chunk.to_vec());
        }
        self
    }

    /// Draw a rule along the inline axis.
    pub fn draw_i_axis_rule(&mut self, length: i32, width: i32) -> Result<&mut Self> {
        let params = rule_params(length, width)?;
        Ok(self.push(DIR, params))
    }

    /// Draw a rule along the baseline axis.
    pub fn draw_b_axis_rule(&mut self, length: i32, width: i32) -> Result<&mut Self> {
        let params = rule_params(length, width)?;
        Ok(self.push(DBR, params))
    }

    /// No operation carrying arbitrary bytes.
    pub fn no_operation(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len().min(253);
        self.push(NOP, data[..len].to_vec())
    }

    /// Whether nothing was added.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Pack the sequences into chains, each at most `max` bytes long.
    pub fn into_chains(self, max: usize) -> Result<Vec<Vec<u8>>> {
        let mut chains = Vec::new();
        let mut pending: Vec<&ControlSequence> = Vec::new();
        let mut size = ESCAPE.len();

        for seq in &self.sequences {
            if ESCAPE.len() + seq.encoded_len() > max {
                return Err(Error::InvalidArgument(format!(
                    "control sequence {:#04x} does not fit in {} bytes",
                    seq.code, max
                )));
            }
            if size + seq.encoded_len() > max {
                chains.push(encode_chain(&pending));
                pending.clear();
                size = ESCAPE.len();
            }
            size += seq.encoded_len();
            pending.push(seq);
        }
        if !pending.is_empty() {
            chains.push(encode_chain(&pending));
        }
        Ok(chains)
    }
}

/// Signed 16-bit parameter; PTOCA measures cannot exceed it.
fn short(value: i32, what: &str) -> Result<[u8; 2]> {
    i16::try_from(value)
        .map(i16::to_be_bytes)
        .map_err(|_| Error::InvalidArgument(format!("{} {} is outside -32768..=32767", what, value)))
}

fn rule_params(length: i32, width: i32) -> Result<Vec<u8>> {
    let mut params = short(length, "rule length")?.to_vec();
    params.extend_from_slice(&short(width, "rule width")?);
    // width fraction
    params.push(0);
    Ok(params)
}

fn encode_chain(sequences: &[&ControlSequence]) -> Vec<u8> {
    let mut buf = ESCAPE.to_vec();
    let last = sequences.len().saturating_sub(1);
    for (i, seq) in sequences.iter().enumerate() {
        seq.encode_into(&mut buf, i != last);
    }
    buf
}

/// Text settings already in effect at the end of the emitted data.
#[derive(Debug, Clone, Copy, Default)]
struct TextState {
    font: Option<u8>,
    color: Option<Color>,
    rotation: Option<i32>,
    svi: i32,
    sia: i32,
}

impl TextState {
    fn orient(&mut self, builder: &mut PtocaBuilder, rotation: i32) -> Result<()> {
        if self.rotation != Some(rotation) {
            builder.set_text_orientation(rotation)?;
            self.rotation = Some(rotation);
        }
        Ok(())
    }

    fn colour(&mut self, builder: &mut PtocaBuilder, color: &Color) {
        if self.color.as_ref() != Some(color) {
            builder.set_extended_text_color(color);
            self.color = Some(*color);
        }
    }
}

/// A presentation text object (BPT, PTX..., EPT).
#[derive(Debug, Clone)]
pub struct PresentationTextObject {
    name: String,
    data: Vec<Vec<u8>>,
    max_data: usize,
    state: TextState,
}

impl PresentationTextObject {
    /// Create an empty object.
    pub fn new(name: String) -> Self {
        Self {
            name,
            data: Vec::new(),
            max_data: MAX_DATA_LENGTH,
            state: TextState::default(),
        }
    }

    /// Limit the size of each Presentation Text Data field.
    pub fn with_max_data(mut self, max_data: usize) -> Self {
        self.max_data = max_data.clamp(16, MAX_DATA_LENGTH);
        self
    }

    /// Object name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of Presentation Text Data fields.
    pub fn data_field_count(&self) -> usize {
        self.data.len()
    }

    /// Encoded PTOCA data per field.
    pub fn data(&self) -> &[Vec<u8>] {
        &self.data
    }

    /// Add a run of text.
    pub fn add_text(&mut self, info: &TextDataInfo) -> Result<()> {
        let mut state = self.state;
        let mut builder = PtocaBuilder::new();
        state.orient(&mut builder, info.rotation)?;
        builder
            .absolute_move_inline(info.x)?
            .absolute_move_baseline(info.y)?;
        if state.font != Some(info.font_reference) {
            builder.set_coded_font_local(info.font_reference);
            state.font = Some(info.font_reference);
        }
        state.colour(&mut builder, &info.color);
        if state.svi != info.variable_space_increment {
            builder.set_variable_space_increment(info.variable_space_increment)?;
            state.svi = info.variable_space_increment;
        }
        if state.sia != info.inter_character_adjustment {
            builder.set_intercharacter_adjustment(info.inter_character_adjustment);
            state.sia = info.inter_character_adjustment;
        }
        builder.transparent_data(&info.encoded(), info.encoding.bytes_per_char());
        self.append(builder)?;
        self.state = state;
        Ok(())
    }

    /// Add a rule.
    pub fn add_line(&mut self, info: &LineDataInfo) -> Result<()> {
        let mut state = self.state;
        let mut builder = PtocaBuilder::new();
        state.orient(&mut builder, info.rotation)?;
        builder
            .absolute_move_inline(info.x1)?
            .absolute_move_baseline(info.y1)?;
        state.colour(&mut builder, &info.color);
        if info.is_horizontal() {
            builder.draw_i_axis_rule(info.x2 - info.x1, info.thickness)?;
        } else {
            builder.draw_b_axis_rule(info.y2 - info.y1, info.thickness)?;
        }
        self.append(builder)?;
        self.state = state;
        Ok(())
    }

    /// Add a no-operation sequence.
    pub fn add_no_operation(&mut self, content: &[u8]) -> Result<()> {
        let mut builder = PtocaBuilder::new();
        builder.no_operation(content);
        self.append(builder)
    }

    /// Nothing is added when packing fails.
    fn append(&mut self, builder: PtocaBuilder) -> Result<()> {
        for chain in builder.into_chains(self.max_data)? {
            match self.data.last_mut() {
                Some(last) if last.len() + chain.len() <= self.max_data => last.extend(chain),
                _ => self.data.push(chain),
            }
        }
        Ok(())
    }
}

impl Streamable for PresentationTextObject {
    fn write_to(&self, writer: &mut StructuredFieldWriter<'_>) -> Result<()> {
        writer.named(sf_type::BEGIN, category::PRESENTATION_TEXT, &self.name)?;
        for data in &self.data {
            writer.field(sf_type::DATA, category::PRESENTATION_TEXT, data)?;
        }
        writer.named(sf_type::END, category::PRESENTATION_TEXT, &self.name)
    }
}
