//! Entities: an id plus the components attached to it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use scene_component::document::COMPONENT_ELEMENT;
use scene_component::{
    AttributeChange, ChangeSink, Component, ComponentClass, ComponentPtr, ComponentRegistry,
    EntityId, NameComponent, ParentLink,
};
use scene_xml::Element;
use tracing::{info, warn};

use crate::action::{Action, ActionParams, ActionReceiver, ReceiverId};
use crate::observer::SceneHub;

/// Tag of an entity element in a scene document.
pub const ENTITY_ELEMENT: &str = "entity";

/// Shared, mutable handle to an entity.
pub type EntityPtr = Rc<RefCell<Entity>>;

/// One addressable object: an immutable id, its components in attach order
/// and its named actions.
///
/// Components are shared handles; the entity only claims them. Dropping the
/// entity detaches every component still attached so that handles kept
/// elsewhere stay valid and parentless.
pub struct Entity {
    id: EntityId,
    components: Vec<ComponentPtr>,
    actions: HashMap<String, Action>,
    registry: Rc<ComponentRegistry>,
    hub: Weak<SceneHub>,
}

impl Entity {
    /// An entity outside any scene.
    #[must_use]
    pub fn new(id: EntityId, registry: Rc<ComponentRegistry>) -> Self {
        Self::in_scene(id, registry, Weak::new())
    }

    pub(crate) fn in_scene(
        id: EntityId,
        registry: Rc<ComponentRegistry>,
        hub: Weak<SceneHub>,
    ) -> Self {
        Self {
            id,
            components: Vec::new(),
            actions: HashMap::new(),
            registry,
            hub,
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The notification hub of the owning scene, if it is still alive.
    #[must_use]
    pub fn scene(&self) -> Option<Rc<SceneHub>> {
        self.hub.upgrade()
    }

    fn link(&self) -> ParentLink {
        let sink: Weak<dyn ChangeSink> = self.hub.clone();
        ParentLink::new(self.id, sink)
    }

    // -- Components --

    /// Attach a free component.
    ///
    /// Rejected (returns `false`, nothing changes) if the component already
    /// has a parent, is currently borrowed, or another component with the
    /// same type and name is attached. An attached component that is
    /// mutably borrowed elsewhere cannot be compared and counts as a clash.
    pub fn add_component(&mut self, component: ComponentPtr, change: AttributeChange) -> bool {
        {
            let Ok(mut candidate) = component.try_borrow_mut() else {
                return false;
            };
            if candidate.parent_entity().is_some()
                || self.clashes_with(candidate.type_name(), candidate.name())
            {
                return false;
            }
            candidate.set_parent_entity(Some(self.link()));
        }
        self.components.push(Rc::clone(&component));
        if let Some(hub) = self.scene() {
            hub.emit_component_added(self.id, &*component.borrow(), change);
        }
        true
    }

    /// Detach a component. Observers hear about it while the component is
    /// still attached. Returns `false`, with a warning, if the component is
    /// not attached to this entity.
    pub fn remove_component(&mut self, component: &ComponentPtr, change: AttributeChange) -> bool {
        let Some(index) = self.components.iter().position(|c| Rc::ptr_eq(c, component)) else {
            let type_name = component.try_borrow().map(|c| c.type_name()).unwrap_or("?");
            warn!(entity = %self.id, component = type_name, "failed to remove component");
            return false;
        };
        if let Some(hub) = self.scene() {
            hub.emit_component_removed(self.id, &*component.borrow(), change);
        }
        component.borrow_mut().set_parent_entity(None);
        self.components.remove(index);
        true
    }

    /// The first component of `type_name`, created through the registry and
    /// attached if there is none. `None` if the type is not registered.
    pub fn get_or_create_component(
        &mut self,
        type_name: &str,
        change: AttributeChange,
    ) -> Option<ComponentPtr> {
        if let Some(existing) = self.component(type_name) {
            return Some(existing);
        }
        let component = self.registry.create(type_name)?;
        self.attach_created(component, change)
    }

    /// Like [`Entity::get_or_create_component`], matching the instance name
    /// too.
    pub fn get_or_create_component_named(
        &mut self,
        type_name: &str,
        name: &str,
        change: AttributeChange,
    ) -> Option<ComponentPtr> {
        if let Some(existing) = self.component_named(type_name, name) {
            return Some(existing);
        }
        let component = self.registry.create_named(type_name, name)?;
        self.attach_created(component, change)
    }

    fn attach_created(
        &mut self,
        component: ComponentPtr,
        change: AttributeChange,
    ) -> Option<ComponentPtr> {
        if self.add_component(Rc::clone(&component), change) {
            Some(component)
        } else {
            None
        }
    }

    /// Attached components in attach order.
    #[must_use]
    pub fn components(&self) -> &[ComponentPtr] {
        &self.components
    }

    fn clashes_with(&self, type_name: &str, name: &str) -> bool {
        self.components.iter().any(|c| match c.try_borrow() {
            Ok(c) => c.type_name() == type_name && c.name() == name,
            Err(_) => {
                warn!(
                    entity = %self.id,
                    component = type_name,
                    "attached component is borrowed, cannot check uniqueness"
                );
                true
            }
        })
    }

    fn find(&self, matches: impl Fn(&dyn Component) -> bool) -> Option<ComponentPtr> {
        self.components
            .iter()
            .find(|c| c.try_borrow().is_ok_and(|c| matches(&*c)))
            .cloned()
    }

    /// The first component of `type_name`.
    #[must_use]
    pub fn component(&self, type_name: &str) -> Option<ComponentPtr> {
        self.find(|c| c.type_name() == type_name)
    }

    #[must_use]
    pub fn component_named(&self, type_name: &str, name: &str) -> Option<ComponentPtr> {
        self.find(|c| c.type_name() == type_name && c.name() == name)
    }

    /// The attached component with the same type and name as `other`.
    #[must_use]
    pub fn component_like(&self, other: &dyn Component) -> Option<ComponentPtr> {
        self.component_named(other.type_name(), other.name())
    }

    /// The first component of a registered class.
    #[must_use]
    pub fn component_of<T: ComponentClass>(&self) -> Option<ComponentPtr> {
        self.component(T::TYPE_NAME)
    }

    #[must_use]
    pub fn has_component(&self, type_name: &str) -> bool {
        self.component(type_name).is_some()
    }

    #[must_use]
    pub fn has_component_named(&self, type_name: &str, name: &str) -> bool {
        self.component_named(type_name, name).is_some()
    }

    /// Value of the `name` attribute of the entity's name component, or an
    /// empty string.
    #[must_use]
    pub fn name(&self) -> String {
        self.name_field("name")
    }

    #[must_use]
    pub fn description(&self) -> String {
        self.name_field("description")
    }

    fn name_field(&self, attribute: &str) -> String {
        let Some(component) = self.component_of::<NameComponent>() else {
            return String::new();
        };
        let component = component.borrow();
        component
            .attribute(attribute)
            .and_then(|a| a.get::<String>())
            .unwrap_or_default()
    }

    /// Detach every component. Used when the scene destroys the entity.
    pub(crate) fn detach_all(&mut self) {
        for component in self.components.drain(..) {
            if let Ok(mut component) = component.try_borrow_mut() {
                component.set_parent_entity(None);
            }
        }
    }

    // -- Actions --

    /// The action called `name`, registered now if it was not already.
    pub fn register_action(&mut self, name: &str) -> &mut Action {
        self.actions
            .entry(name.to_string())
            .or_insert_with(|| Action::new(name))
    }

    pub fn connect_action(&mut self, name: &str, receiver: ActionReceiver) -> ReceiverId {
        self.register_action(name).connect(receiver)
    }

    #[must_use]
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    #[must_use]
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    /// Receivers of `name`, for triggering once the entity is no longer
    /// borrowed.
    ///
    /// An action with no receivers is dropped instead and `None` returned, so
    /// one-shot action names do not pile up.
    pub fn take_action_receivers(&mut self, name: &str) -> Option<Vec<ActionReceiver>> {
        let receivers = self.register_action(name).receivers();
        if receivers.is_empty() {
            info!(entity = %self.id, action = name, "no receivers found for action, removing it");
            self.actions.remove(name);
            return None;
        }
        Some(receivers)
    }

    /// Trigger `name` on `entity` with `params`; returns whether anything was
    /// triggered.
    ///
    /// Receivers run after the entity borrow is released, so they may borrow
    /// the entity again.
    pub fn exec<S: AsRef<str>>(entity: &EntityPtr, name: &str, params: &[S]) -> bool {
        let Some(receivers) = entity.borrow_mut().take_action_receivers(name) else {
            return false;
        };
        let params = ActionParams::from_slice(params);
        for receiver in receivers {
            receiver(&params);
        }
        true
    }

    // -- Documents --

    /// Append an entity element holding every serializable component.
    pub fn serialize_to(&self, parent: &mut Element) {
        let element = parent
            .append_child(Element::new(ENTITY_ELEMENT).with_attribute("id", self.id.to_string()));
        for component in &self.components {
            component.borrow().serialize_to(element);
        }
    }

    /// Apply every component element of an entity element, creating
    /// components that are not attached yet. Returns the type names that
    /// could not be created.
    pub fn deserialize_from(&mut self, element: &Element, change: AttributeChange) -> Vec<String> {
        let mut skipped = Vec::new();
        for child in element.children_named(COMPONENT_ELEMENT) {
            let Some(type_name) = child.attribute("type") else {
                warn!(entity = %self.id, "component element without a type");
                continue;
            };
            let name = child.attribute("name").unwrap_or_default();
            match self.get_or_create_component_named(type_name, name, change) {
                Some(component) => {
                    component.borrow_mut().deserialize_from(child, change);
                }
                None => {
                    warn!(entity = %self.id, component = type_name, "cannot create component");
                    skipped.push(type_name.to_string());
                }
            }
        }
        skipped
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        self.detach_all();
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("components", &self.components.len())
            .field("actions", &self.actions.len())
            .field("in_scene", &(self.hub.strong_count() > 0))
            .finish()
    }
}
