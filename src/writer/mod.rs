//! AFP writing module for generating MO:DCA data streams.
//!
//! This module turns painting requests into structured fields.
//!
//! ## Architecture
//!
//! ```text
//! painting requests (text, rules, shapes, shadings)
//!     ↓
//! [DataStream] (document state machine, active page/overlay)
//!     ↓
//! [PageObject] (AEG + PTOCA / GOCA / IM content objects)
//!     ↓
//! [Container] (document, page groups, streaming order)
//!     ↓
//! [StructuredFieldWriter] (0x5A introducer, length, identifier)
//!     ↓
//! bytes
//! ```
//!
//! Object names come from a per-document [`Factory`]; every object type has
//! its own counter, so names never repeat inside one document.

mod container;
mod data_stream;
pub mod factory;
pub mod goca;
pub mod image;
mod object_container;
pub mod page;
pub mod ptoca;
mod resource_group;
pub mod structured_field;

pub use container::{Container, ContainerKind, Member};
pub use data_stream::{DataStream, DocumentState, SavedPage};
pub use factory::{Factory, NameAllocator};
pub use goca::{GraphicsObject, LineType, ObjectArea};
pub use image::{CellPosition, ImageObject};
pub use object_container::{ObjectContainer, ObjectType};
pub use page::{Content, FontMapping, PageKind, PageObject};
pub use ptoca::{PresentationTextObject, PtocaBuilder};
pub use resource_group::{Resource, ResourceGroup, ResourceLevel};
pub use structured_field::{Streamable, StructuredField, StructuredFieldWriter};
