//! Attributes, components and component factories of the scene core.
//!
//! An [`Attribute`] is a named, typed value slot. A [`Component`] owns an
//! ordered list of attributes and knows its entity by [`EntityId`]. The
//! [`DynamicComponent`] can add and remove attributes at runtime and
//! reconcile its attribute set against a document. Components are built by
//! type name through a [`ComponentRegistry`].

pub mod attribute;
pub mod builtin;
pub mod change;
pub mod component;
pub mod document;
pub mod dynamic;
pub mod entity_id;
pub mod error;
pub mod registry;
pub mod value;

pub use attribute::Attribute;
pub use builtin::{NameComponent, SoundComponent, TouchableComponent};
pub use change::{AttributeChange, UnknownChangeType};
pub use component::{
    AsComponent, ChangeSink, Component, ComponentCore, ComponentEvent, ComponentListener,
    ComponentPtr, ListenerId, ParentLink, into_ptr,
};
pub use dynamic::{DynamicComponent, ReconcilePolicy, ReconcileReport};
pub use entity_id::{EntityAllocator, EntityId};
pub use error::AttributeError;
pub use registry::{AttributeFactory, ComponentClass, ComponentRegistry, FactoryContext};
pub use value::{AssetReference, AttributeKind, AttributeType, AttributeValue};
