//! String-keyed factories for components and attributes.
//!
//! The scene never names concrete component types. It asks a
//! [`ComponentRegistry`] for a type name and gets back a [`ComponentPtr`], or
//! `None` for a type nobody registered. Dynamic components use the
//! [`AttributeFactory`] the same way for attribute type names.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::attribute::Attribute;
use crate::builtin::{NameComponent, SoundComponent, TouchableComponent};
use crate::component::{Component, ComponentPtr, into_ptr};
use crate::dynamic::{DynamicComponent, ReconcilePolicy};
use crate::value::AttributeKind;

/// Maps attribute type names to the kind of attribute they create.
#[derive(Debug, Clone)]
pub struct AttributeFactory {
    kinds: HashMap<String, AttributeKind>,
}

impl AttributeFactory {
    /// A factory that knows no type names.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// A factory that knows every built-in attribute type by its canonical
    /// type name.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut factory = Self::empty();
        for kind in AttributeKind::ALL {
            factory.register(kind.type_name(), kind);
        }
        factory
    }

    /// Register (or re-point) a type name.
    pub fn register(&mut self, type_name: impl Into<String>, kind: AttributeKind) {
        self.kinds.insert(type_name.into(), kind);
    }

    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.kinds.contains_key(type_name)
    }

    #[must_use]
    pub fn kind_of(&self, type_name: &str) -> Option<AttributeKind> {
        self.kinds.get(type_name).copied()
    }

    /// A fresh attribute of the named type, at its default value.
    /// `None` for unknown type names.
    #[must_use]
    pub fn create(&self, type_name: &str, name: &str) -> Option<Attribute> {
        self.kind_of(type_name).map(|kind| Attribute::new(name, kind))
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for AttributeFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// What component constructors get to work with.
#[derive(Debug, Clone, Default)]
pub struct FactoryContext {
    pub attributes: Rc<AttributeFactory>,
    pub reconcile_policy: ReconcilePolicy,
}

impl FactoryContext {
    #[must_use]
    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.reconcile_policy = policy;
        self
    }
}

/// A component type that can be registered by type.
pub trait ComponentClass: Component + Sized {
    const TYPE_NAME: &'static str;

    fn new_component(context: &FactoryContext) -> Self;
}

type Constructor = Box<dyn Fn(&FactoryContext) -> ComponentPtr>;

/// Registry of component constructors keyed by type name.
pub struct ComponentRegistry {
    constructors: HashMap<String, Constructor>,
    context: FactoryContext,
}

impl ComponentRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new(context: FactoryContext) -> Self {
        Self {
            constructors: HashMap::new(),
            context,
        }
    }

    /// A registry with the dynamic component and the built-in static
    /// components registered.
    #[must_use]
    pub fn with_defaults(context: FactoryContext) -> Self {
        let mut registry = Self::new(context);
        registry.register::<DynamicComponent>();
        registry.register::<NameComponent>();
        registry.register::<SoundComponent>();
        registry.register::<TouchableComponent>();
        registry
    }

    /// Register `T` under its type name, replacing any previous constructor.
    pub fn register<T: ComponentClass>(&mut self) {
        self.register_fn(T::TYPE_NAME, |context| into_ptr(T::new_component(context)));
    }

    /// Register a constructor closure under `type_name`.
    pub fn register_fn<F>(&mut self, type_name: impl Into<String>, constructor: F)
    where
        F: Fn(&FactoryContext) -> ComponentPtr + 'static,
    {
        self.constructors
            .insert(type_name.into(), Box::new(constructor));
    }

    /// Build an unnamed component, or `None` if the type is not registered.
    #[must_use]
    pub fn create(&self, type_name: &str) -> Option<ComponentPtr> {
        self.constructors
            .get(type_name)
            .map(|constructor| constructor(&self.context))
    }

    /// Build a component and give it an instance name.
    #[must_use]
    pub fn create_named(&self, type_name: &str, name: &str) -> Option<ComponentPtr> {
        let component = self.create(type_name)?;
        component.borrow_mut().set_name(name);
        Some(component)
    }

    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn context(&self) -> &FactoryContext {
        &self.context
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_defaults(FactoryContext::default())
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.type_names())
            .field("context", &self.context)
            .finish()
    }
}
