//! Pages and overlays.
//!
//! Both share one layout:
//!
//! ```text
//! BPG | BMO
//!   [BRG ... ERG]          page resource group, when resources were added
//!   BAG MCF MPO PGD PTD EAG
//!   content objects and fields, in creation order
//! EPG | EMO
//! ```

use super::factory::Factory;
use super::goca::GraphicsObject;
use super::image::ImageObject;
use super::ptoca::PresentationTextObject;
use super::resource_group::{Resource, ResourceGroup};
use super::structured_field::{
    category, encode_name, orientation, push_i24, push_u24, sf_type, triplet, StructuredField,
    Streamable, StructuredFieldWriter,
};
use crate::elements::{LineDataInfo, TextDataInfo};
use crate::error::{Error, Result};
use crate::fonts::encoding::encode_cp500;

/// Longest attribute name or value of a tag logical element.
pub const MAX_TLE_TEXT: usize = 250;

/// Whether the object is a page or an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// A page (BPG/EPG)
    Page,
    /// A page overlay (BMO/EMO)
    Overlay,
}

impl PageKind {
    fn category(&self) -> u8 {
        match self {
            PageKind::Page => category::PAGE,
            PageKind::Overlay => category::OVERLAY,
        }
    }
}

/// One Map Coded Font entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMapping {
    /// Local identifier used by text (SCFL)
    pub reference: u8,
    /// Font character set name
    pub character_set: String,
    /// Code page name
    pub code_page: String,
    /// Point size for outline fonts, 0 for raster fonts
    pub size: f32,
}

impl FontMapping {
    fn repeating_group(&self) -> Vec<u8> {
        let mut body = triplet::fully_qualified_name(triplet::FQN_CODE_PAGE_NAME_REF, &self.code_page);
        body.extend(triplet::fully_qualified_name(
            triplet::FQN_FONT_CHARSET_NAME_REF,
            &self.character_set,
        ));
        body.extend(triplet::resource_local_id(triplet::RLI_CODED_FONT, self.reference));
        if self.size > 0.0 {
            body.extend(triplet::font_horizontal_scale(self.size));
        }
        let mut group = ((body.len() + 2) as u16).to_be_bytes().to_vec();
        group.extend(body);
        group
    }
}

/// Content of a page in creation order.
#[derive(Debug, Clone)]
pub enum Content {
    /// Presentation text
    Text(PresentationTextObject),
    /// Graphics
    Graphics(GraphicsObject),
    /// IM image
    Image(ImageObject),
    /// A single structured field (IPO, IPS, TLE, NOP)
    Field(StructuredField),
}

/// A page or overlay under construction.
#[derive(Debug, Clone)]
pub struct PageObject {
    kind: PageKind,
    name: String,
    aeg_name: String,
    width: u32,
    height: u32,
    rotation: i32,
    x_resolution: u16,
    y_resolution: u16,
    fonts: Vec<FontMapping>,
    overlays: Vec<String>,
    resources: Option<ResourceGroup>,
    contents: Vec<Content>,
}

impl PageObject {
    /// Create an empty page. Rotation must be 0, 90, 180 or 270.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: PageKind,
        name: String,
        aeg_name: String,
        width: u32,
        height: u32,
        rotation: i32,
        x_resolution: u16,
        y_resolution: u16,
    ) -> Result<Self> {
        orientation(rotation)?;
        if x_resolution == 0 || y_resolution == 0 {
            return Err(Error::InvalidArgument(format!(
                "page {} needs a non-zero resolution",
                name
            )));
        }
        Ok(Self {
            kind,
            name,
            aeg_name,
            width,
            height,
            rotation: rotation.rem_euclid(360),
            x_resolution,
            y_resolution,
            fonts: Vec::new(),
            overlays: Vec::new(),
            resources: None,
            contents: Vec::new(),
        })
    }

    /// Page or overlay.
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    /// Object name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active environment group name.
    pub fn aeg_name(&self) -> &str {
        &self.aeg_name
    }

    /// Width in page units.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in page units.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rotation in degrees, normalised to 0..360.
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// Units per inch along x.
    pub fn x_resolution(&self) -> u16 {
        self.x_resolution
    }

    /// Units per inch along y.
    pub fn y_resolution(&self) -> u16 {
        self.y_resolution
    }

    /// Mapped fonts.
    pub fn fonts(&self) -> &[FontMapping] {
        &self.fonts
    }

    /// Names of the mapped overlays, in local id order (ids start at 1).
    pub fn overlays(&self) -> &[String] {
        &self.overlays
    }

    /// Page resource group, if any resource was added.
    pub fn resource_group(&self) -> Option<&ResourceGroup> {
        self.resources.as_ref()
    }

    /// Content in creation order.
    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    /// Map a coded font. A reference that is already mapped is kept as is.
    pub fn add_font(&mut self, mapping: FontMapping) {
        if self.fonts.iter().any(|f| f.reference == mapping.reference) {
            log::debug!("font reference {} already mapped on {}", mapping.reference, self.name);
            return;
        }
        self.fonts.push(mapping);
    }

    /// Map an overlay and return its local id.
    pub fn map_overlay(&mut self, name: &str) -> Result<u8> {
        if let Some(pos) = self.overlays.iter().position(|o| o == name) {
            return Ok(pos as u8 + 1);
        }
        if self.overlays.len() >= u8::MAX as usize {
            return Err(Error::IllegalState(format!(
                "page {} maps too many overlays",
                self.name
            )));
        }
        self.overlays.push(name.to_string());
        Ok(self.overlays.len() as u8)
    }

    /// Add a resource to the page resource group.
    pub fn add_resource(&mut self, factory: &mut Factory, resource: Resource) -> Result<()> {
        if self.resources.is_none() {
            self.resources = Some(factory.create_resource_group()?);
        }
        if let Some(group) = self.resources.as_mut() {
            group.add(resource);
        }
        Ok(())
    }

    fn text_object(
        &mut self,
        factory: &mut Factory,
        max_data: usize,
    ) -> Result<&mut PresentationTextObject> {
        if !matches!(self.contents.last(), Some(Content::Text(_))) {
            let text = factory.create_presentation_text_object()?.with_max_data(max_data);
            self.contents.push(Content::Text(text));
        }
        match self.contents.last_mut() {
            Some(Content::Text(text)) => Ok(text),
            _ => Err(Error::IllegalState("no presentation text object".into())),
        }
    }

    /// Add a run of text.
    pub fn add_text(&mut self, factory: &mut Factory, max_data: usize, info: &TextDataInfo) -> Result<()> {
        self.text_object(factory, max_data)?.add_text(info)
    }

    /// Add a rule.
    pub fn add_line(&mut self, factory: &mut Factory, max_data: usize, info: &LineDataInfo) -> Result<()> {
        self.text_object(factory, max_data)?.add_line(info)
    }

    /// Add a graphics object and return it for drawing.
    pub fn add_graphics(&mut self, graphics: GraphicsObject) -> Result<&mut GraphicsObject> {
        self.contents.push(Content::Graphics(graphics));
        match self.contents.last_mut() {
            Some(Content::Graphics(graphics)) => Ok(graphics),
            _ => Err(Error::IllegalState("no graphics object".into())),
        }
    }

    /// Add an image object.
    pub fn add_image(&mut self, image: ImageObject) {
        self.contents.push(Content::Image(image));
    }

    /// Include Page Overlay at a position.
    pub fn include_page_overlay(&mut self, name: &str, x: i32, y: i32, rotation: i32) -> Result<()> {
        let mut data = encode_name(name).to_vec();
        push_i24(&mut data, x);
        push_i24(&mut data, y);
        data.extend_from_slice(&orientation(rotation)?);
        self.contents.push(Content::Field(StructuredField::new(
            sf_type::INCLUDE,
            category::PAGE_OVERLAY,
            data,
        )));
        Ok(())
    }

    /// Include Page Segment at a position.
    pub fn include_page_segment(&mut self, name: &str, x: i32, y: i32) {
        let mut data = encode_name(name).to_vec();
        push_i24(&mut data, x);
        push_i24(&mut data, y);
        self.contents.push(Content::Field(StructuredField::new(
            sf_type::INCLUDE,
            category::PAGE_SEGMENT,
            data,
        )));
    }

    /// Tag Logical Element with an attribute name and value.
    pub fn tag_logical_element(&mut self, name: &str, value: &str, sequence: u32) -> Result<()> {
        let field = tag_logical_element(name, value, sequence)?;
        self.contents.push(Content::Field(field));
        Ok(())
    }

    /// No Operation carrying a comment.
    pub fn no_operation(&mut self, content: &str) {
        self.contents.push(Content::Field(no_operation(content)));
    }

    fn descriptor_data(&self, trailer: &[u8]) -> Vec<u8> {
        let mut data = vec![0x00, 0x00];
        data.extend_from_slice(&self.x_resolution.saturating_mul(10).to_be_bytes());
        data.extend_from_slice(&self.y_resolution.saturating_mul(10).to_be_bytes());
        push_u24(&mut data, self.width);
        push_u24(&mut data, self.height);
        data.extend_from_slice(trailer);
        data
    }

    fn write_grouped(
        writer: &mut StructuredFieldWriter<'_>,
        category: u8,
        groups: Vec<Vec<u8>>,
    ) -> Result<()> {
        let mut data = Vec::new();
        for group in groups {
            if !data.is_empty() && data.len() + group.len() > writer.max_data() {
                writer.field(sf_type::MAP, category, &data)?;
                data.clear();
            }
            data.extend(group);
        }
        if !data.is_empty() {
            writer.field(sf_type::MAP, category, &data)?;
        }
        Ok(())
    }

    fn write_environment_group(&self, writer: &mut StructuredFieldWriter<'_>) -> Result<()> {
        writer.named(sf_type::BEGIN, category::ACTIVE_ENVIRONMENT_GROUP, &self.aeg_name)?;
        Self::write_grouped(
            writer,
            category::CODED_FONT,
            self.fonts.iter().map(FontMapping::repeating_group).collect(),
        )?;
        let overlays = self
            .overlays
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut group = vec![0x00, 0x12];
                group.extend(triplet::fully_qualified_name(
                    triplet::FQN_BEGIN_RESOURCE_OBJECT_REF,
                    name,
                ));
                group.extend(triplet::resource_local_id(triplet::RLI_PAGE_OVERLAY, i as u8 + 1));
                group
            })
            .collect();
        Self::write_grouped(writer, category::PAGE_OVERLAY, overlays)?;
        writer.field(sf_type::DESCRIPTOR, category::PAGE, &self.descriptor_data(&[0, 0, 0]))?;
        writer.field(
            sf_type::MIGRATION,
            category::PRESENTATION_TEXT,
            &self.descriptor_data(&[0, 0]),
        )?;
        writer.named(sf_type::END, category::ACTIVE_ENVIRONMENT_GROUP, &self.aeg_name)
    }
}

impl Streamable for PageObject {
    fn write_to(&self, writer: &mut StructuredFieldWriter<'_>) -> Result<()> {
        let start = writer.fields_written();
        writer.named(sf_type::BEGIN, self.kind.category(), &self.name)?;
        if let Some(group) = self.resources.as_ref().filter(|g| !g.is_empty()) {
            group.write_to(writer)?;
        }
        self.write_environment_group(writer)?;
        for content in &self.contents {
            match content {
                Content::Text(text) => text.write_to(writer)?,
                Content::Graphics(graphics) => graphics.write_to(writer)?,
                Content::Image(image) => image.write_to(writer)?,
                Content::Field(field) => field.write_to(writer)?,
            }
        }
        writer.named(sf_type::END, self.kind.category(), &self.name)?;
        log::debug!(
            "{:?} {} written ({} fields)",
            self.kind,
            self.name,
            writer.fields_written() - start
        );
        Ok(())
    }
}

/// Build a Tag Logical Element field.
pub fn tag_logical_element(name: &str, value: &str, sequence: u32) -> Result<StructuredField> {
    let name_bytes = encode_cp500(name);
    let value_bytes = encode_cp500(value);
    if name_bytes.len() > MAX_TLE_TEXT || value_bytes.len() > MAX_TLE_TEXT {
        return Err(Error::InvalidArgument(format!(
            "tag logical element name and value are limited to {} characters",
            MAX_TLE_TEXT
        )));
    }
    let mut data = triplet::fully_qualified_text(triplet::FQN_ATTRIBUTE_NAME, &name_bytes);
    data.extend(triplet::attribute_value(&value_bytes));
    data.extend(triplet::attribute_qualifier(sequence, 1));
    Ok(StructuredField::new(sf_type::ATTRIBUTE, category::PROCESS_ELEMENT, data))
}

/// Build a No Operation field.
pub fn no_operation(content: &str) -> StructuredField {
    StructuredField::new(sf_type::DATA, category::NO_OPERATION, encode_cp500(content))
}

/// Build an Invoke Medium Map field.
pub fn invoke_medium_map(name: &str) -> StructuredField {
    StructuredField::named(sf_type::MAP, category::MEDIUM_MAP, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::structured_field::MAX_DATA_LENGTH;

    fn page() -> PageObject {
        PageObject::new(PageKind::Page, "PGN00001".into(), "AEG00001".into(), 2400, 3200, 0, 240, 240)
            .unwrap()
    }

    fn identifiers(out: &[u8]) -> Vec<[u8; 3]> {
        let mut ids = Vec::new();
        let mut pos = 0;
        while pos < out.len() {
            let len = u16::from_be_bytes([out[pos + 1], out[pos + 2]]) as usize;
            ids.push([out[pos + 3], out[pos + 4], out[pos + 5]]);
            pos += len + 1;
        }
        ids
    }

    #[test]
    fn test_rejects_odd_rotation() {
        let err = PageObject::new(PageKind::Page, "P".into(), "A".into(), 1, 1, 45, 240, 240);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_page_layout() {
        let mut out = Vec::new();
        let mut writer = StructuredFieldWriter::new(&mut out, MAX_DATA_LENGTH);
        page().write_to(&mut writer).unwrap();
        assert_eq!(
            identifiers(&out),
            vec![
                [0xD3, 0xA8, 0xAF],
                [0xD3, 0xA8, 0xC9],
                [0xD3, 0xA6, 0xAF],
                [0xD3, 0xB1, 0x9B],
                [0xD3, 0xA9, 0xC9],
                [0xD3, 0xA9, 0xAF],
            ]
        );
    }

    #[test]
    fn test_page_descriptor() {
        let data = page().descriptor_data(&[0, 0, 0]);
        assert_eq!(
            data,
            vec![0, 0, 0x09, 0x60, 0x09, 0x60, 0, 0x09, 0x60, 0, 0x0C, 0x80, 0, 0, 0]
        );
    }

    #[test]
    fn test_font_mapping_group() {
        let mapping = FontMapping {
            reference: 1,
            character_set: "C0H200B0".into(),
            code_page: "T1V10500".into(),
            size: 12.0,
        };
        let group = mapping.repeating_group();
        assert_eq!(group.len(), 34);
        assert_eq!(&group[..2], &[0, 34]);
        assert_eq!(&group[26..30], &[4, 0x24, 0x05, 1]);
        assert_eq!(&group[30..], &[4, 0x5D, 0x00, 240]);
    }

    #[test]
    fn test_duplicate_font_reference_kept_once() {
        let mut page = page();
        for _ in 0..2 {
            page.add_font(FontMapping {
                reference: 1,
                character_set: "C0H200B0".into(),
                code_page: "T1V10500".into(),
                size: 0.0,
            });
        }
        assert_eq!(page.fonts().len(), 1);
    }

    #[test]
    fn test_text_objects_merge() {
        let mut factory = Factory::new();
        let mut page = page();
        page.add_text(&mut factory, MAX_DATA_LENGTH, &TextDataInfo::new(1, 0, 0, "a")).unwrap();
        page.add_line(&mut factory, MAX_DATA_LENGTH, &LineDataInfo::new(0, 0, 10, 0, 1)).unwrap();
        page.no_operation("x");
        page.add_text(&mut factory, MAX_DATA_LENGTH, &TextDataInfo::new(1, 0, 0, "b")).unwrap();
        assert_eq!(page.contents().len(), 3);
        assert_eq!(factory.names().count("PT"), 2);
    }

    #[test]
    fn test_overlay_ids() {
        let mut page = page();
        assert_eq!(page.map_overlay("OVL00001").unwrap(), 1);
        assert_eq!(page.map_overlay("OVL00002").unwrap(), 2);
        assert_eq!(page.map_overlay("OVL00001").unwrap(), 1);
    }

    #[test]
    fn test_tag_logical_element_layout() {
        let field = tag_logical_element("Author", "Me", 7).unwrap();
        assert_eq!(field.identifier(), [0xD3, 0xA0, 0x90]);
        assert_eq!(&field.data[..4], &[10, 0x02, 0x0B, 0x00]);
        assert_eq!(&field.data[10..14], &[6, 0x36, 0x00, 0x00]);
        assert_eq!(&field.data[16..], &[10, 0x80, 0, 0, 0, 7, 0, 0, 0, 1]);
        assert!(tag_logical_element(&"x".repeat(251), "", 1).is_err());
    }

    #[test]
    fn test_include_page_overlay_field() {
        let mut page = page();
        page.include_page_overlay("OVL00001", 100, 200, 90).unwrap();
        let Content::Field(field) = &page.contents()[0] else {
            panic!("expected a field");
        };
        assert_eq!(field.identifier(), [0xD3, 0xAF, 0xD8]);
        assert_eq!(&field.data[8..], &[0, 0, 100, 0, 0, 200, 0x2D, 0x00]);
    }
}
