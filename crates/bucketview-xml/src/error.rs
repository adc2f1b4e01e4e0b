//! Errors raised while reading or writing listing documents.

use std::io;

/// Why a listing document could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The writer's sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The body is not well-formed XML.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// A document or entry lacks an element it cannot do without, such as
    /// the root, a `Contents/Key` or a `Bucket/Name`.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// The root is not a listing, e.g. an `<Error>` or an HTML page.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// Text content that could not be decoded.
    #[error("failed to parse value: {0}")]
    ParseError(String),
}

impl XmlError {
    /// Whether the body was readable XML but not a listing.
    #[must_use]
    pub fn is_wrong_document(&self) -> bool {
        matches!(self, Self::UnexpectedElement(_) | Self::MissingElement(_))
    }
}
