//! Documents and page groups.
//!
//! A container streams its members as soon as they are complete. A saved
//! page leaves a placeholder that holds back everything after it until the
//! page is restored and ended.

use super::factory::Factory;
use super::page::PageObject;
use super::resource_group::{Resource, ResourceGroup};
use super::structured_field::{
    category, sf_type, Streamable, StructuredField, StructuredFieldWriter,
};
use crate::error::Result;
use std::collections::VecDeque;

/// Document or page group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// BDT/EDT
    Document,
    /// BNG/ENG
    PageGroup,
}

impl ContainerKind {
    fn category(&self) -> u8 {
        match self {
            ContainerKind::Document => category::DOCUMENT,
            ContainerKind::PageGroup => category::PAGE_GROUP,
        }
    }
}

/// A member waiting to be written.
#[derive(Debug)]
pub enum Member {
    /// A finished page
    Page(Box<PageObject>),
    /// A nested page group
    Group(Container),
    /// Placeholder of a saved page
    Saved(u32),
    /// Resources declared before the following pages
    Resources(ResourceGroup),
    /// Loose fields (IMM, TLE, NOP)
    Fields(Vec<StructuredField>),
}

/// A document or page group.
#[derive(Debug)]
pub struct Container {
    kind: ContainerKind,
    name: String,
    members: VecDeque<Member>,
    pending: Option<ResourceGroup>,
    started: bool,
    complete: bool,
    ended: bool,
}

impl Container {
    /// Create an open, unwritten container.
    pub fn new(kind: ContainerKind, name: String) -> Self {
        Self {
            kind,
            name,
            members: VecDeque::new(),
            pending: None,
            started: false,
            complete: false,
            ended: false,
        }
    }

    /// Document or page group.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Container name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether no more members will be added.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether the end field was written.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Members not yet written.
    pub fn pending_members(&self) -> usize {
        self.members.len()
    }

    /// Mark the container complete.
    pub fn complete(&mut self) {
        self.flush_pending();
        self.complete = true;
    }

    /// The innermost open page group, if any.
    pub fn open_group_mut(&mut self) -> Option<&mut Container> {
        match self.members.back_mut() {
            Some(Member::Group(group)) if !group.complete => Some(group),
            _ => None,
        }
    }

    /// Whether a page group is open.
    pub fn has_open_group(&self) -> bool {
        matches!(self.members.back(), Some(Member::Group(group)) if !group.complete)
    }

    /// Run `f` on the container new members go to: the open page group,
    /// else this one.
    pub fn with_current<R>(&mut self, f: impl FnOnce(&mut Container) -> R) -> R {
        if let Some(Member::Group(group)) = self.members.back_mut() {
            if !group.complete {
                return f(group);
            }
        }
        f(self)
    }

    /// Queue a resource for the group written before the next member.
    pub fn add_pending_resource(&mut self, factory: &mut Factory, resource: Resource) -> Result<()> {
        if self.pending.is_none() {
            self.pending = Some(factory.create_resource_group()?);
        }
        if let Some(group) = self.pending.as_mut() {
            group.add(resource);
        }
        Ok(())
    }

    /// Whether resources are queued.
    pub fn has_pending_resources(&self) -> bool {
        self.pending.is_some()
    }

    fn flush_pending(&mut self) {
        if let Some(group) = self.pending.take() {
            self.members.push_back(Member::Resources(group));
        }
    }

    /// Append a member after any queued resources.
    pub fn push(&mut self, member: Member) {
        self.flush_pending();
        self.members.push_back(member);
    }

    /// Replace the placeholder `id`, searching nested groups. Returns the
    /// page back when no placeholder matches.
    pub fn fill_placeholder(
        &mut self,
        id: u32,
        page: Box<PageObject>,
    ) -> std::result::Result<(), Box<PageObject>> {
        let mut page = page;
        for member in self.members.iter_mut() {
            match member {
                Member::Saved(saved) if *saved == id => {
                    *member = Member::Page(page);
                    return Ok(());
                },
                Member::Group(group) => match group.fill_placeholder(id, page) {
                    Ok(()) => return Ok(()),
                    Err(returned) => page = returned,
                },
                _ => {},
            }
        }
        Err(page)
    }

    /// Write everything that can be written now.
    pub fn write_ready(&mut self, writer: &mut StructuredFieldWriter<'_>) -> Result<()> {
        if self.ended {
            return Ok(());
        }
        if !self.started {
            writer.named(sf_type::BEGIN, self.kind.category(), &self.name)?;
            self.started = true;
            log::debug!("{:?} {} started", self.kind, self.name);
        }
        while let Some(member) = self.members.front_mut() {
            match member {
                Member::Saved(_) => break,
                Member::Group(group) => {
                    group.write_ready(writer)?;
                    if !group.ended {
                        break;
                    }
                },
                Member::Page(page) => page.write_to(writer)?,
                Member::Resources(group) => group.write_to(writer)?,
                Member::Fields(fields) => {
                    for field in fields.iter() {
                        field.write_to(writer)?;
                    }
                },
            }
            self.members.pop_front();
        }
        if self.complete && self.members.is_empty() {
            writer.named(sf_type::END, self.kind.category(), &self.name)?;
            self.ended = true;
            log::debug!("{:?} {} ended", self.kind, self.name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::page::PageKind;
    use crate::writer::structured_field::MAX_DATA_LENGTH;

    fn page(name: &str) -> Box<PageObject> {
        Box::new(
            PageObject::new(PageKind::Page, name.into(), "AEG00001".into(), 100, 100, 0, 240, 240)
                .unwrap(),
        )
    }

    fn write(container: &mut Container) -> Vec<u8> {
        let mut out = Vec::new();
        let mut writer = StructuredFieldWriter::new(&mut out, MAX_DATA_LENGTH);
        container.write_ready(&mut writer).unwrap();
        out
    }

    #[test]
    fn test_streams_pages_as_added() {
        let mut doc = Container::new(ContainerKind::Document, "DOC00001".into());
        assert_eq!(&write(&mut doc)[3..6], &[0xD3, 0xA8, 0xA8]);
        doc.push(Member::Page(page("PGN00001")));
        assert!(!write(&mut doc).is_empty());
        assert_eq!(doc.pending_members(), 0);
        doc.complete();
        let tail = write(&mut doc);
        assert_eq!(&tail[3..6], &[0xD3, 0xA9, 0xA8]);
        assert!(doc.is_ended());
        assert!(write(&mut doc).is_empty());
    }

    #[test]
    fn test_pending_resources_precede_next_page() {
        use crate::writer::object_container::ObjectContainer;
        let mut factory = Factory::new();
        let mut doc = Container::new(ContainerKind::Document, "DOC00001".into());
        let oc = ObjectContainer::new("OC000001".into());
        doc.add_pending_resource(&mut factory, Resource::Container(oc)).unwrap();
        assert!(doc.has_pending_resources());
        doc.push(Member::Page(page("PGN00001")));
        assert!(!doc.has_pending_resources());
        assert!(matches!(doc.members.front(), Some(Member::Resources(_))));
        assert_eq!(doc.pending_members(), 2);
    }

    #[test]
    fn test_placeholder_blocks_following_pages() {
        let mut doc = Container::new(ContainerKind::Document, "DOC00001".into());
        doc.push(Member::Saved(1));
        doc.push(Member::Page(page("PGN00002")));
        write(&mut doc);
        assert_eq!(doc.pending_members(), 2);
        assert!(doc.fill_placeholder(1, page("PGN00001")).is_ok());
        write(&mut doc);
        assert_eq!(doc.pending_members(), 0);
    }

    #[test]
    fn test_placeholder_in_nested_group() {
        let mut doc = Container::new(ContainerKind::Document, "DOC00001".into());
        doc.push(Member::Group(Container::new(ContainerKind::PageGroup, "PGP00001".into())));
        doc.with_current(|c| c.push(Member::Saved(4)));
        assert!(doc.has_open_group());
        if let Some(group) = doc.open_group_mut() {
            group.complete();
        }
        assert!(!doc.has_open_group());
        write(&mut doc);
        assert_eq!(doc.pending_members(), 1);
        assert!(doc.fill_placeholder(9, page("X")).is_err());
        assert!(doc.fill_placeholder(4, page("PGN00001")).is_ok());
        write(&mut doc);
        assert_eq!(doc.pending_members(), 0);
    }
}
