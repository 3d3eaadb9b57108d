//! Scene-layer error types.

use scene_xml::XmlError;
use thiserror::Error;

/// Errors from loading scene documents.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The text is not a well-formed document.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// The root element is not a scene.
    #[error("expected a <scene> document, found <{0}>")]
    NotAScene(String),

    /// An entity element is missing its id, or the id is 0 or not a number.
    #[error("entity element has no valid id: '{0}'")]
    InvalidEntityId(String),
}
