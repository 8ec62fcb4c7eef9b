//! Error types for the conversion crate.
//!
//! Path-level failures are reported as [`PathError`] with the byte offset of
//! the offending token in the `d` attribute. Document-level failures wrap
//! them in [`ConvertError`] together with the path's identity.

use std::io;
use thiserror::Error;

/// Errors raised while tokenizing or interpreting one path's command string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// Bad command syntax, arity or a non-numeric operand.
    #[error("malformed path data at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// A drawing command appeared before any moveto opened a subpath.
    #[error("command '{command}' at offset {offset} has no open subpath")]
    UnexpectedCommand { command: char, offset: usize },

    /// A valid SVG path command outside the supported M/L/H/V/C/Z set.
    #[error("unsupported command '{command}' at offset {offset}")]
    UnsupportedCommand { command: char, offset: usize },
}

impl PathError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        PathError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    /// Byte offset into the `d` attribute where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            PathError::Malformed { offset, .. }
            | PathError::UnexpectedCommand { offset, .. }
            | PathError::UnsupportedCommand { offset, .. } => *offset,
        }
    }
}

/// Errors that can occur while converting a whole document.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// A path element could not be converted.
    #[error("path {path}: {source}")]
    Path {
        path: String,
        #[source]
        source: PathError,
    },

    /// A rotate/scale/skew transform was found. Only ever logged.
    #[error("unsupported transform '{0}' ignored")]
    UnsupportedTransform(String),

    /// The SVG document is not well-formed XML.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An element attribute could not be decoded.
    #[error("attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// A line of the OBJ input could not be understood. `line` is 0 when
    /// the mesh was assembled in memory rather than read from a file.
    #[error("mesh line {line}: {reason}")]
    Mesh { line: usize, reason: String },

    /// I/O error while reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
