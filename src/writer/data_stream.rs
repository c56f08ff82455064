//! The data stream writer.
//!
//! [`DataStream`] drives document construction:
//!
//! ```text
//! NoDocument -> Open (page groups, pages, overlays) -> Closed
//! ```
//!
//! Content calls go to the active target: the open overlay if there is one,
//! else the open page. Every finished page is written as soon as nothing
//! before it in the document is still pending.
//!
//! ## Example
//!
//! ```
//! use afp_oxide::config::AfpConfig;
//! use afp_oxide::elements::TextDataInfo;
//! use afp_oxide::writer::DataStream;
//!
//! # fn main() -> afp_oxide::Result<()> {
//! let mut stream = DataStream::new(Vec::new(), AfpConfig::default());
//! stream.start_document()?;
//! stream.start_page(2040, 2640, 0, 240, 240)?;
//! stream.create_font(1, "C0H200B0", "T1V10500", 12.0)?;
//! stream.create_text(&TextDataInfo::new(1, 240, 480, "Hello"))?;
//! stream.end_page()?;
//! stream.end_document()?;
//! let bytes = stream.into_inner();
//! assert_eq!(bytes[0], 0x5A);
//! # Ok(())
//! # }
//! ```

use super::container::{Container, Member};
use super::factory::Factory;
use super::goca::{GraphicsObject, ObjectArea};
use super::image::CellPosition;
use super::page::{self, FontMapping, PageObject};
use super::resource_group::{Resource, ResourceLevel};
use super::structured_field::{orientation, StructuredFieldWriter};
use crate::config::AfpConfig;
use crate::elements::{Color, LineDataInfo, TextDataInfo};
use crate::error::{Error, Result};
use crate::fonts::{subset_font, FontSubsetter, TrueTypeFont};
use std::io::Write;

/// Lifecycle of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// `start_document` not called yet
    NoDocument,
    /// Document open
    Open,
    /// Document ended; no further calls are valid
    Closed,
}

/// Where content calls go.
#[derive(Debug, Default)]
enum ActiveTarget {
    #[default]
    None,
    Page(Box<PageObject>),
    Overlay {
        page: Box<PageObject>,
        overlay: Box<PageObject>,
    },
}

/// A page detached with [`DataStream::save_page`].
#[derive(Debug)]
pub struct SavedPage {
    id: u32,
    page: Box<PageObject>,
}

impl SavedPage {
    /// Placeholder id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The detached page.
    pub fn page(&self) -> &PageObject {
        &self.page
    }

    /// The detached page, for preparation while it is saved.
    pub fn page_mut(&mut self) -> &mut PageObject {
        &mut self.page
    }
}

/// Streaming MO:DCA writer over any byte sink.
pub struct DataStream<W: Write> {
    out: W,
    config: AfpConfig,
    factory: Factory,
    state: DocumentState,
    document: Option<Container>,
    active: ActiveTarget,
    restoring: Option<u32>,
    next_saved_id: u32,
    outstanding_saved: usize,
    fields_written: usize,
}

impl<W: Write> DataStream<W> {
    /// Create a writer over `out`.
    pub fn new(out: W, config: AfpConfig) -> Self {
        Self {
            out,
            config,
            factory: Factory::new(),
            state: DocumentState::NoDocument,
            document: None,
            active: ActiveTarget::None,
            restoring: None,
            next_saved_id: 0,
            outstanding_saved: 0,
            fields_written: 0,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &AfpConfig {
        &self.config
    }

    /// Document state.
    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// Whether the document was ended.
    pub fn is_complete(&self) -> bool {
        self.state == DocumentState::Closed
    }

    /// Structured fields written so far.
    pub fn fields_written(&self) -> usize {
        self.fields_written
    }

    /// Object factory of this document.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Give back the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn document_mut(&mut self) -> Result<&mut Container> {
        match self.state {
            DocumentState::Open => self
                .document
                .as_mut()
                .ok_or_else(|| Error::IllegalState("document missing".into())),
            DocumentState::NoDocument => Err(Error::IllegalState("no document started".into())),
            DocumentState::Closed => Err(Error::IllegalState("document already ended".into())),
        }
    }

    fn write_ready(&mut self) -> Result<()> {
        if let Some(document) = self.document.as_mut() {
            let mut writer =
                StructuredFieldWriter::new(&mut self.out, self.config.max_structured_field_data);
            document.write_ready(&mut writer)?;
            self.fields_written += writer.fields_written();
        }
        Ok(())
    }

    fn target(active: &mut ActiveTarget) -> Result<&mut PageObject> {
        match active {
            ActiveTarget::None => Err(Error::IllegalState("no page or overlay is active".into())),
            ActiveTarget::Page(page) => Ok(page.as_mut()),
            ActiveTarget::Overlay { overlay, .. } => Ok(overlay.as_mut()),
        }
    }

    /// The page or overlay content calls go to.
    pub fn current_page_mut(&mut self) -> Result<&mut PageObject> {
        Self::target(&mut self.active)
    }

    /// Whether a page is active.
    pub fn has_active_page(&self) -> bool {
        !matches!(self.active, ActiveTarget::None)
    }

    /// Whether an overlay is open.
    pub fn has_active_overlay(&self) -> bool {
        matches!(self.active, ActiveTarget::Overlay { .. })
    }

    // ---- lifecycle ----

    /// Begin the document and write its begin field.
    pub fn start_document(&mut self) -> Result<()> {
        match self.state {
            DocumentState::NoDocument => {},
            DocumentState::Open => {
                return Err(Error::IllegalState("document already started".into()))
            },
            DocumentState::Closed => {
                return Err(Error::IllegalState("document already ended".into()))
            },
        }
        let document = self.factory.create_document()?;
        log::info!("Starting document {}", document.name());
        self.document = Some(document);
        self.state = DocumentState::Open;
        self.write_ready()
    }

    /// Begin a page group, ending any open one first.
    pub fn start_page_group(&mut self) -> Result<()> {
        self.document_mut()?;
        if self.has_active_page() {
            return Err(Error::IllegalState("cannot start a page group inside a page".into()));
        }
        self.end_page_group()?;
        let group = self.factory.create_page_group()?;
        log::debug!("Starting page group {}", group.name());
        self.document_mut()?.push(Member::Group(group));
        Ok(())
    }

    /// Finish the open page group; does nothing when none is open.
    pub fn end_page_group(&mut self) -> Result<()> {
        let has_group = self.document_mut()?.has_open_group();
        if !has_group {
            return Ok(());
        }
        self.end_page()?;
        if let Some(group) = self.document_mut()?.open_group_mut() {
            group.complete();
        }
        self.write_ready()
    }

    /// Begin a page.
    ///
    /// An open overlay is closed together with the page it sits on, and that
    /// page is finished as by [`end_page`](Self::end_page). A plain active
    /// page is an error.
    pub fn start_page(
        &mut self,
        width: u32,
        height: u32,
        rotation: i32,
        x_resolution: u16,
        y_resolution: u16,
    ) -> Result<()> {
        self.document_mut()?;
        if self.has_active_page() && !self.has_active_overlay() {
            return Err(Error::IllegalState("a page is already active".into()));
        }
        let page = self
            .factory
            .create_page(width, height, rotation, x_resolution, y_resolution)?;
        if self.has_active_overlay() {
            log::debug!("Closing the open overlay and its page before {}", page.name());
            self.end_page()?;
        }
        log::debug!("Starting page {}", page.name());
        self.active = ActiveTarget::Page(Box::new(page));
        Ok(())
    }

    /// Finish the active page (and any open overlay) and write it when
    /// possible. Does nothing without an active page.
    pub fn end_page(&mut self) -> Result<()> {
        self.end_overlay()?;
        let page = match std::mem::take(&mut self.active) {
            ActiveTarget::Page(page) => page,
            ActiveTarget::None => {
                log::debug!("end_page without an active page");
                return Ok(());
            },
            other => {
                self.active = other;
                return Err(Error::IllegalState("overlay still open".into()));
            },
        };
        let restoring = self.restoring.take();
        let document = self.document_mut()?;
        match restoring {
            Some(id) => {
                if document.fill_placeholder(id, page).is_err() {
                    return Err(Error::IllegalState(format!(
                        "no placeholder for saved page {}",
                        id
                    )));
                }
                self.outstanding_saved = self.outstanding_saved.saturating_sub(1);
            },
            None => document.with_current(|c| c.push(Member::Page(page))),
        }
        self.write_ready()
    }

    /// Begin an overlay on the active page at `(x, y)` and direct content
    /// calls to it.
    #[allow(clippy::too_many_arguments)]
    pub fn start_overlay(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        x_resolution: u16,
        y_resolution: u16,
        rotation: i32,
    ) -> Result<()> {
        let mut page = match std::mem::take(&mut self.active) {
            ActiveTarget::Page(page) => page,
            other => {
                let open = matches!(other, ActiveTarget::Overlay { .. });
                self.active = other;
                return Err(Error::IllegalState(if open {
                    "an overlay is already open".into()
                } else {
                    "an overlay needs an active page".into()
                }));
            },
        };
        let overlay =
            match self
                .factory
                .create_overlay(width, height, rotation, x_resolution, y_resolution)
            {
                Ok(overlay) => overlay,
                Err(e) => {
                    self.active = ActiveTarget::Page(page);
                    return Err(e);
                },
            };
        let included = page
            .include_page_overlay(overlay.name(), x, y, rotation)
            .and_then(|_| page.map_overlay(overlay.name()));
        if let Err(e) = included {
            self.active = ActiveTarget::Page(page);
            return Err(e);
        }
        log::debug!("Starting overlay {} on {}", overlay.name(), page.name());
        self.active = ActiveTarget::Overlay {
            page,
            overlay: Box::new(overlay),
        };
        Ok(())
    }

    /// Finish the open overlay and store it with its page; does nothing
    /// when no overlay is open.
    pub fn end_overlay(&mut self) -> Result<()> {
        match std::mem::take(&mut self.active) {
            ActiveTarget::Overlay { mut page, overlay } => {
                let added = page.add_resource(&mut self.factory, Resource::Overlay(overlay));
                self.active = ActiveTarget::Page(page);
                added
            },
            other => {
                self.active = other;
                Ok(())
            },
        }
    }

    /// Detach the active page, leaving a placeholder at its position in the
    /// output order.
    pub fn save_page(&mut self) -> Result<SavedPage> {
        self.document_mut()?;
        self.end_overlay()?;
        if self.restoring.is_some() {
            return Err(Error::IllegalState("cannot save a restored page again".into()));
        }
        let page = match std::mem::take(&mut self.active) {
            ActiveTarget::Page(page) => page,
            other => {
                self.active = other;
                return Err(Error::IllegalState("no active page to save".into()));
            },
        };
        self.next_saved_id += 1;
        let id = self.next_saved_id;
        self.document_mut()?.with_current(|c| c.push(Member::Saved(id)));
        self.outstanding_saved += 1;
        log::debug!("Saved page {} as placeholder {}", page.name(), id);
        Ok(SavedPage { id, page })
    }

    /// Make a saved page active again; the next [`end_page`](Self::end_page)
    /// puts it at its placeholder.
    pub fn restore_page(&mut self, saved: SavedPage) -> Result<()> {
        self.document_mut()?;
        if self.has_active_page() {
            return Err(Error::IllegalState("a page is already active".into()));
        }
        self.restoring = Some(saved.id);
        self.active = ActiveTarget::Page(saved.page);
        Ok(())
    }

    /// End any open page and page group, write the document trailer and
    /// flush the sink.
    pub fn end_document(&mut self) -> Result<()> {
        self.document_mut()?;
        self.end_page()?;
        self.end_page_group()?;
        if self.outstanding_saved > 0 {
            return Err(Error::IllegalState(format!(
                "{} saved page(s) were never restored",
                self.outstanding_saved
            )));
        }
        self.document_mut()?.complete();
        self.write_ready()?;
        self.out.flush()?;
        self.document = None;
        self.state = DocumentState::Closed;
        log::info!("Document ended after {} structured fields", self.fields_written);
        Ok(())
    }

    // ---- content ----

    /// Map a coded font on the active page under `font_reference`.
    pub fn create_font(
        &mut self,
        font_reference: u8,
        character_set: &str,
        code_page: &str,
        size: f32,
    ) -> Result<()> {
        Self::target(&mut self.active)?.add_font(FontMapping {
            reference: font_reference,
            character_set: character_set.to_string(),
            code_page: code_page.to_string(),
            size,
        });
        Ok(())
    }

    /// Draw a rule.
    pub fn create_line(&mut self, info: &LineDataInfo) -> Result<()> {
        let max = self.config.max_structured_field_data;
        Self::target(&mut self.active)?.add_line(&mut self.factory, max, info)
    }

    /// Draw text.
    pub fn create_text(&mut self, info: &TextDataInfo) -> Result<()> {
        let max = self.config.max_structured_field_data;
        Self::target(&mut self.active)?.add_text(&mut self.factory, max, info)
    }

    /// Shade an area with a dithered grey of `color`.
    ///
    /// Every shading is its own IM image object named `IMIMGnnn`, so one
    /// document holds at most 999 of them; the next call fails with
    /// [`Error::IllegalState`] and leaves the page unchanged.
    pub fn create_shading(&mut self, x: i32, y: i32, width: i32, height: i32, color: &Color) -> Result<()> {
        let page = Self::target(&mut self.active)?;
        let cell = CellPosition::rotated(
            x,
            y,
            width,
            height,
            page.rotation(),
            page.width() as i32,
            page.height() as i32,
        );
        let mut image = self.factory.create_im_image_object()?;
        image.set_shading(cell, color, page.rotation(), page.x_resolution(), page.y_resolution())?;
        page.add_image(image);
        Ok(())
    }

    /// Include an overlay by name.
    pub fn create_include_page_overlay(&mut self, name: &str, x: i32, y: i32, rotation: i32) -> Result<()> {
        let page = Self::target(&mut self.active)?;
        page.include_page_overlay(name, x, y, rotation)?;
        page.map_overlay(name)?;
        Ok(())
    }

    /// Include a page segment by name.
    pub fn create_include_page_segment(&mut self, name: &str, x: i32, y: i32) -> Result<()> {
        Self::target(&mut self.active)?.include_page_segment(name, x, y);
        Ok(())
    }

    /// Tag the active page with attribute name/value pairs.
    pub fn create_page_tag_logical_element(&mut self, attributes: &[(&str, &str)]) -> Result<()> {
        let page = Self::target(&mut self.active)?;
        for (name, value) in attributes {
            let sequence = self.factory.next_tle_sequence();
            page.tag_logical_element(name, value, sequence)?;
        }
        Ok(())
    }

    /// Tag the open page group with attribute name/value pairs.
    pub fn create_page_group_tag_logical_element(&mut self, attributes: &[(&str, &str)]) -> Result<()> {
        if !self.document_mut()?.has_open_group() {
            return Err(Error::IllegalState("no page group is open".into()));
        }
        let mut fields = Vec::with_capacity(attributes.len());
        for (name, value) in attributes {
            let sequence = self.factory.next_tle_sequence();
            fields.push(page::tag_logical_element(name, value, sequence)?);
        }
        self.document_mut()?.with_current(|c| c.push(Member::Fields(fields)));
        Ok(())
    }

    /// Add a no-operation comment to the active page, or between pages
    /// when none is active.
    pub fn create_no_operation(&mut self, content: &str) -> Result<()> {
        if let Ok(page) = Self::target(&mut self.active) {
            page.no_operation(content);
            return Ok(());
        }
        let field = page::no_operation(content);
        self.document_mut()?.with_current(|c| c.push(Member::Fields(vec![field])));
        self.write_ready()
    }

    /// Invoke a medium map for the following pages.
    pub fn create_invoke_medium_map(&mut self, name: &str) -> Result<()> {
        if self.has_active_page() {
            return Err(Error::IllegalState("a medium map cannot be invoked inside a page".into()));
        }
        let field = page::invoke_medium_map(name);
        self.document_mut()?.with_current(|c| c.push(Member::Fields(vec![field])));
        self.write_ready()
    }

    /// Add a graphics object covering `area` and return it for drawing.
    pub fn create_graphics_object(&mut self, area: ObjectArea) -> Result<&mut GraphicsObject> {
        orientation(area.rotation)?;
        let page = Self::target(&mut self.active)?;
        let mut graphics = self.factory.create_graphics_object()?;
        graphics.set_view_port(area)?;
        page.add_graphics(graphics)
    }

    /// Store font file bytes in an object container at `level` (the
    /// configured default when `None`) and return the container name.
    pub fn create_font_resource(&mut self, data: Vec<u8>, level: Option<ResourceLevel>) -> Result<String> {
        let level = level.unwrap_or(self.config.default_resource_level);
        let mut container = self.factory.create_object_container()?;
        container.set_data(data);
        let name = container.name().to_string();
        self.add_resource(Resource::Container(container), level)?;
        log::debug!("Font resource {} added at {:?} level", name, level);
        Ok(name)
    }

    /// Embed a font: the used subset when subsetting is enabled, else the
    /// whole file.
    pub fn embed_font(
        &mut self,
        font: &TrueTypeFont,
        subsetter: &FontSubsetter,
        level: Option<ResourceLevel>,
    ) -> Result<String> {
        let data = if self.config.subset_fonts {
            subset_font(font, subsetter.glyph_map())?
        } else {
            font.data().to_vec()
        };
        self.create_font_resource(data, level)
    }

    fn add_resource(&mut self, resource: Resource, level: ResourceLevel) -> Result<()> {
        match level {
            ResourceLevel::Inline | ResourceLevel::Page => {
                let page = match &mut self.active {
                    ActiveTarget::None => {
                        return Err(Error::IllegalState(
                            "page level resources need an active page".into(),
                        ))
                    },
                    ActiveTarget::Page(page) => page,
                    ActiveTarget::Overlay { page, .. } => page,
                };
                page.add_resource(&mut self.factory, resource)
            },
            ResourceLevel::PageGroup => {
                let factory = &mut self.factory;
                let document = match self.state {
                    DocumentState::Open => self.document.as_mut(),
                    _ => None,
                }
                .ok_or_else(|| Error::IllegalState("no document started".into()))?;
                document.with_current(|c| c.add_pending_resource(factory, resource))
            },
            ResourceLevel::Document => {
                let factory = &mut self.factory;
                let document = match self.state {
                    DocumentState::Open => self.document.as_mut(),
                    _ => None,
                }
                .ok_or_else(|| Error::IllegalState("no document started".into()))?;
                document.add_pending_resource(factory, resource)
            },
        }
    }
}

impl<W: Write> std::fmt::Debug for DataStream<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStream")
            .field("state", &self.state)
            .field("active", &self.active)
            .field("outstanding_saved", &self.outstanding_saved)
            .field("fields_written", &self.fields_written)
            .finish()
    }
}
