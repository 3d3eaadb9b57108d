//! Scene observers and the hub that fans notifications out to them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use scene_component::{Attribute, AttributeChange, ChangeSink, Component, EntityId};

/// External listener on a scene (renderer, replicator, inspector...).
///
/// Every method defaults to doing nothing. Observers are called
/// synchronously, in registration order, while the entity and component
/// involved are borrowed: they must read what they need from the arguments
/// instead of re-borrowing the same `EntityPtr` or `ComponentPtr`.
pub trait SceneObserver {
    fn entity_created(&self, _entity: EntityId, _change: AttributeChange) {}

    fn entity_removed(&self, _entity: EntityId, _change: AttributeChange) {}

    fn component_added(
        &self,
        _entity: EntityId,
        _component: &dyn Component,
        _change: AttributeChange,
    ) {
    }

    /// Fired before the component is detached, so it still reports its
    /// parent and last state.
    fn component_removed(
        &self,
        _entity: EntityId,
        _component: &dyn Component,
        _change: AttributeChange,
    ) {
    }

    fn component_changed(
        &self,
        _entity: EntityId,
        _component: &dyn Component,
        _change: AttributeChange,
    ) {
    }

    fn attribute_changed(
        &self,
        _entity: EntityId,
        _component: &dyn Component,
        _attribute: &Attribute,
        _change: AttributeChange,
    ) {
    }
}

/// Handle returned by [`SceneHub::add_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Registered observers of one scene. Components reach it through a weak
/// [`ChangeSink`] handle.
#[derive(Default)]
pub struct SceneHub {
    observers: RefCell<Vec<(ObserverId, Rc<dyn SceneObserver>)>>,
    next_id: Cell<u64>,
}

impl SceneHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&self, observer: Rc<dyn SceneObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observers.borrow_mut().push((id, observer));
        id
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(o, _)| *o != id);
        observers.len() != before
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    // Copy the list out so observers may add or remove observers while
    // being notified.
    fn snapshot(&self) -> Vec<Rc<dyn SceneObserver>> {
        self.observers
            .borrow()
            .iter()
            .map(|(_, o)| Rc::clone(o))
            .collect()
    }

    /// Tell every observer that `entity` was created.
    pub fn emit_entity_created(&self, entity: EntityId, change: AttributeChange) {
        for observer in self.snapshot() {
            observer.entity_created(entity, change);
        }
    }

    /// Tell every observer that `entity` is being removed.
    pub fn emit_entity_removed(&self, entity: EntityId, change: AttributeChange) {
        for observer in self.snapshot() {
            observer.entity_removed(entity, change);
        }
    }

    /// Tell every observer that `component` was attached to `entity`.
    pub fn emit_component_added(
        &self,
        entity: EntityId,
        component: &dyn Component,
        change: AttributeChange,
    ) {
        for observer in self.snapshot() {
            observer.component_added(entity, component, change);
        }
    }

    /// Tell every observer that `component` is about to be detached from
    /// `entity`.
    pub fn emit_component_removed(
        &self,
        entity: EntityId,
        component: &dyn Component,
        change: AttributeChange,
    ) {
        for observer in self.snapshot() {
            observer.component_removed(entity, component, change);
        }
    }
}

impl ChangeSink for SceneHub {
    fn component_changed(
        &self,
        entity: EntityId,
        component: &dyn Component,
        change: AttributeChange,
    ) {
        for observer in self.snapshot() {
            observer.component_changed(entity, component, change);
        }
    }

    fn attribute_changed(
        &self,
        entity: EntityId,
        component: &dyn Component,
        attribute: &Attribute,
        change: AttributeChange,
    ) {
        for observer in self.snapshot() {
            observer.attribute_changed(entity, component, attribute, change);
        }
    }
}

impl fmt::Debug for SceneHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneHub")
            .field("observers", &self.observer_count())
            .finish()
    }
}
