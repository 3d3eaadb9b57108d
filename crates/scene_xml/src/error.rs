//! Document-layer error types.

use quick_xml::events::attributes::AttrError;

/// Errors that can occur while reading or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The XML text is malformed.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An element carries a malformed attribute.
    #[error("malformed XML attribute: {0}")]
    Attribute(#[from] AttrError),

    /// Tag or attribute name is not valid UTF-8.
    #[error("invalid UTF-8 in name: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Writer produced bytes that are not valid UTF-8.
    #[error("invalid UTF-8 in output: {0}")]
    Output(#[from] std::string::FromUtf8Error),

    /// Writing to the underlying buffer failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document has no root element.
    #[error("document has no root element")]
    Empty,

    /// The document has more than one root element.
    #[error("document has more than one root element (second is <{0}>)")]
    MultipleRoots(String),

    /// An end tag appeared with no open element.
    #[error("unexpected end tag </{0}>")]
    UnexpectedEnd(String),

    /// The text ended while an element was still open.
    #[error("element <{0}> is never closed")]
    Unclosed(String),
}
