// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # AFP Oxide
//!
//! MO:DCA (AFP) data stream writer with a TrueType reader and subsetter for
//! font embedding.
//!
//! ## Core Features
//!
//! ### Fonts
//! - **TrueType Reader**: sfnt and TrueType Collection directories, cmap
//!   format 4, metrics, names, kerning, WinAnsi widths
//! - **Subsetting**: composite closure, glyph renumbering, table checksums and
//!   the head checksum adjustment
//!
//! ### Writing
//! - **Structured Fields**: introducer, identifier, triplets, data splitting
//! - **Data Stream**: documents, page groups, pages, overlays, saved pages,
//!   written incrementally as containers complete
//! - **Content**: presentation text (PTOCA), graphics (GOCA), IM shadings,
//!   object containers for embedded fonts
//! - **Painters**: borders, rectangles and vector shapes in points
//!
//! ## Quick Start
//!
//! ```
//! use afp_oxide::config::AfpConfig;
//! use afp_oxide::elements::{BorderPaintingInfo, BorderStyle};
//! use afp_oxide::painter::{BorderPainter, PaintingState};
//! use afp_oxide::writer::DataStream;
//!
//! # fn main() -> afp_oxide::Result<()> {
//! let config = AfpConfig::default();
//! let mut stream = DataStream::new(Vec::new(), config.clone());
//! stream.start_document()?;
//! stream.start_page(2040, 2640, 0, config.resolution, config.resolution)?;
//!
//! let painter = BorderPainter::new(PaintingState::new(config.resolution));
//! let border = BorderPaintingInfo::new(72.0, 72.0, 540.0, 74.0, true, BorderStyle::Solid);
//! painter.paint(&border, &mut stream)?;
//!
//! stream.end_document()?;
//! assert!(stream.is_complete());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Configuration
pub mod config;

// TrueType reading and subsetting
pub mod fonts;

// Painting requests and geometry
/// Painting requests handed to the data stream
pub mod elements;
pub mod geometry;

// AFP writing
pub mod writer;

// Points-based painters
pub mod painter;

// Re-exports
pub use config::AfpConfig;
pub use error::{Error, Result};
pub use writer::DataStream;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
