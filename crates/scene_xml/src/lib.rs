//! # scene_xml
//!
//! The document context that components serialize into and deserialize from.
//!
//! This crate provides:
//!
//! - [`Element`]: an owned element tree (tag, ordered attributes, children).
//! - [`codec`]: XML text and JSON conversion for [`Element`].
//! - [`error`]: document-layer error types.

pub mod codec;
pub mod element;
pub mod error;

pub use codec::{from_json, parse, to_json, to_string};
pub use element::Element;
pub use error::XmlError;
