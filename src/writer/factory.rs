//! Object factory with per-type name counters.
//!
//! Each object type has a prefix; names are the prefix followed by a
//! zero-padded counter so that every name is exactly 8 characters. One
//! factory serves one document, so names never repeat within it.

use super::container::{Container, ContainerKind};
use super::goca::GraphicsObject;
use super::image::ImageObject;
use super::object_container::ObjectContainer;
use super::page::{PageKind, PageObject};
use super::ptoca::PresentationTextObject;
use super::resource_group::ResourceGroup;
use super::structured_field::NAME_LENGTH;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Document name prefix.
pub const DOCUMENT_PREFIX: &str = "DOC";
/// Page group name prefix.
pub const PAGE_GROUP_PREFIX: &str = "PGP";
/// Page name prefix.
pub const PAGE_PREFIX: &str = "PGN";
/// Overlay name prefix.
pub const OVERLAY_PREFIX: &str = "OVL";
/// Active environment group name prefix.
pub const ACTIVE_ENVIRONMENT_GROUP_PREFIX: &str = "AEG";
/// Resource group name prefix.
pub const RESOURCE_GROUP_PREFIX: &str = "RG";
/// Presentation text object name prefix.
pub const PRESENTATION_TEXT_PREFIX: &str = "PT";
/// Graphics object name prefix.
pub const GRAPHIC_PREFIX: &str = "GRA";
/// IM image object name prefix.
pub const IM_IMAGE_PREFIX: &str = "IMIMG";
/// Object container name prefix.
pub const OBJECT_CONTAINER_PREFIX: &str = "OC";

/// Per-prefix monotonic counters.
#[derive(Debug, Default, Clone)]
pub struct NameAllocator {
    counters: HashMap<&'static str, u32>,
}

impl NameAllocator {
    /// Create an allocator with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next name for a prefix, e.g. `PGN00001`.
    ///
    /// Fails once the counter no longer fits in the remaining digits.
    pub fn next_name(&mut self, prefix: &'static str) -> Result<String> {
        let width = NAME_LENGTH.saturating_sub(prefix.len());
        let counter = self.counters.entry(prefix).or_insert(0);
        let next = *counter + 1;
        if width == 0 || next as u64 >= 10u64.pow(width as u32) {
            return Err(Error::IllegalState(format!(
                "name counter for prefix {} exhausted",
                prefix
            )));
        }
        *counter = next;
        Ok(format!("{}{:0width$}", prefix, next, width = width))
    }

    /// Number of names handed out for a prefix.
    pub fn count(&self, prefix: &str) -> u32 {
        self.counters.get(prefix).copied().unwrap_or(0)
    }
}

/// Creates the named objects of one document.
#[derive(Debug, Default)]
pub struct Factory {
    names: NameAllocator,
    tle_sequence: u32,
}

impl Factory {
    /// Create a factory with fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name allocator of this factory.
    pub fn names(&self) -> &NameAllocator {
        &self.names
    }

    /// Create a document container.
    pub fn create_document(&mut self) -> Result<Container> {
        Ok(Container::new(
            ContainerKind::Document,
            self.names.next_name(DOCUMENT_PREFIX)?,
        ))
    }

    /// Create a page group container.
    pub fn create_page_group(&mut self) -> Result<Container> {
        Ok(Container::new(
            ContainerKind::PageGroup,
            self.names.next_name(PAGE_GROUP_PREFIX)?,
        ))
    }

    /// Create a page.
    pub fn create_page(
        &mut self,
        width: u32,
        height: u32,
        rotation: i32,
        x_resolution: u16,
        y_resolution: u16,
    ) -> Result<PageObject> {
        let name = self.names.next_name(PAGE_PREFIX)?;
        let aeg_name = self.names.next_name(ACTIVE_ENVIRONMENT_GROUP_PREFIX)?;
        PageObject::new(
            PageKind::Page,
            name,
            aeg_name,
            width,
            height,
            rotation,
            x_resolution,
            y_resolution,
        )
    }

    /// Create an overlay.
    pub fn create_overlay(
        &mut self,
        width: u32,
        height: u32,
        rotation: i32,
        x_resolution: u16,
        y_resolution: u16,
    ) -> Result<PageObject> {
        let name = self.names.next_name(OVERLAY_PREFIX)?;
        let aeg_name = self.names.next_name(ACTIVE_ENVIRONMENT_GROUP_PREFIX)?;
        PageObject::new(
            PageKind::Overlay,
            name,
            aeg_name,
            width,
            height,
            rotation,
            x_resolution,
            y_resolution,
        )
    }

    /// Create a resource group.
    pub fn create_resource_group(&mut self) -> Result<ResourceGroup> {
        Ok(ResourceGroup::new(
            self.names.next_name(RESOURCE_GROUP_PREFIX)?,
        ))
    }

    /// Create a presentation text object.
    pub fn create_presentation_text_object(&mut self) -> Result<PresentationTextObject> {
        Ok(PresentationTextObject::new(
            self.names.next_name(PRESENTATION_TEXT_PREFIX)?,
        ))
    }

    /// Create a graphics object.
    pub fn create_graphics_object(&mut self) -> Result<GraphicsObject> {
        Ok(GraphicsObject::new(self.names.next_name(GRAPHIC_PREFIX)?))
    }

    /// Create an IM image object.
    pub fn create_im_image_object(&mut self) -> Result<ImageObject> {
        Ok(ImageObject::new(self.names.next_name(IM_IMAGE_PREFIX)?))
    }

    /// Create an object container.
    pub fn create_object_container(&mut self) -> Result<ObjectContainer> {
        Ok(ObjectContainer::new(
            self.names.next_name(OBJECT_CONTAINER_PREFIX)?,
        ))
    }

    /// Next tag logical element sequence number.
    pub fn next_tle_sequence(&mut self) -> u32 {
        self.tle_sequence += 1;
        self.tle_sequence
    }
}
