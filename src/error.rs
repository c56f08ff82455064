//! Error types for the AFP library.
//!
//! This module defines all error types that can occur while reading and
//! subsetting TrueType fonts and while writing an AFP data stream.
//! Conditions that only deserve a diagnostic (negative border extents,
//! unmapped kerning pairs, missing optional tables) are logged through
//! the `log` facade and never surface here.

/// Result type alias for AFP library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during font processing and stream writing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A mandatory font table is absent or structurally invalid
    #[error("Malformed font: {0}")]
    MalformedFont(String),

    /// The font uses an outline flavor or cmap format this crate cannot handle
    #[error("Unsupported font flavor: {0}")]
    UnsupportedFontFlavor(String),

    /// Seek or copy outside the bounds of a buffer
    #[error("Offset {offset} is out of range for a buffer of {len} bytes")]
    OutOfRange {
        /// Requested offset (end offset for range copies)
        offset: usize,
        /// Length of the buffer
        len: usize,
    },

    /// Read past the end of a buffer
    #[error("End of buffer: needed {needed} bytes at position {position}, buffer holds {len}")]
    EndOfBuffer {
        /// Cursor position when the read started
        position: usize,
        /// Number of bytes the read required
        needed: usize,
        /// Length of the buffer
        len: usize,
    },

    /// Data stream API used out of order
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Argument outside the domain an operation accepts
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error on the output sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
