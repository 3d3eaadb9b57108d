//! # scene_manager
//!
//! Entities and the scene that owns them.
//!
//! - [`Entity`]: an id, attached components and named [`Action`]s.
//! - [`Scene`]: entity lifecycle, id allocation and scene documents.
//! - [`SceneObserver`]: external listeners, fed by the scene's [`SceneHub`]
//!   synchronously and in registration order.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod observer;
pub mod scene;

pub use action::{Action, ActionParams, ActionReceiver, ReceiverId};
pub use config::SceneConfig;
pub use entity::{Entity, EntityPtr};
pub use error::SceneError;
pub use observer::{ObserverId, SceneHub, SceneObserver};
pub use scene::{LoadReport, Scene};
