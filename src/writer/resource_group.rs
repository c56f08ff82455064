//! Resource groups and resource scoping.

use super::object_container::ObjectContainer;
use super::page::PageObject;
use super::structured_field::{
    category, encode_name, sf_type, Streamable, StructuredFieldWriter,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Resource Object Type triplet value for object containers.
const RESOURCE_TYPE_OBJECT_CONTAINER: u8 = 0x92;

/// Scope at which a resource is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceLevel {
    /// Inside the object that uses it
    Inline,
    /// Page resource group
    Page,
    /// Resource group before the pages of the current page group
    PageGroup,
    /// Resource group before the pages of the document
    #[default]
    Document,
}

/// One resource held in a group.
#[derive(Debug, Clone)]
pub enum Resource {
    /// A page overlay
    Overlay(Box<PageObject>),
    /// An object container
    Container(ObjectContainer),
}

impl Resource {
    /// Name of the resource.
    pub fn name(&self) -> &str {
        match self {
            Resource::Overlay(overlay) => overlay.name(),
            Resource::Container(container) => container.name(),
        }
    }
}

/// A resource group (BRG, resources, ERG).
#[derive(Debug, Clone)]
pub struct ResourceGroup {
    name: String,
    resources: Vec<Resource>,
}

impl ResourceGroup {
    /// Create an empty group.
    pub fn new(name: String) -> Self {
        Self {
            name,
            resources: Vec::new(),
        }
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a resource. A resource whose name is already present is ignored.
    pub fn add(&mut self, resource: Resource) {
        if self.contains(resource.name()) {
            log::debug!("resource {} already in group {}", resource.name(), self.name);
            return;
        }
        self.resources.push(resource);
    }

    /// Whether a resource with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.resources.iter().any(|r| r.name() == name)
    }

    /// Resources in insertion order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Streamable for ResourceGroup {
    fn write_to(&self, writer: &mut StructuredFieldWriter<'_>) -> Result<()> {
        writer.named(sf_type::BEGIN, category::RESOURCE_GROUP, &self.name)?;
        for resource in &self.resources {
            match resource {
                Resource::Overlay(overlay) => overlay.write_to(writer)?,
                Resource::Container(container) => {
                    let mut begin = encode_name(container.name()).to_vec();
                    begin.extend_from_slice(&[0x00, 0x00]);
                    begin.extend_from_slice(&[10, 0x21, RESOURCE_TYPE_OBJECT_CONTAINER]);
                    begin.extend_from_slice(&[0; 7]);
                    writer.field(sf_type::BEGIN, category::RESOURCE, &begin)?;
                    container.write_to(writer)?;
                    writer.named(sf_type::END, category::RESOURCE, container.name())?;
                },
            }
        }
        writer.named(sf_type::END, category::RESOURCE_GROUP, &self.name)
    }
}
