//! The scene: owner of entities and hub of change notifications.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use scene_component::{
    AttributeChange, ComponentRegistry, EntityAllocator, EntityId, FactoryContext,
};
use scene_xml::Element;
use tracing::{debug, warn};

use crate::config::SceneConfig;
use crate::entity::{ENTITY_ELEMENT, Entity, EntityPtr};
use crate::error::SceneError;
use crate::observer::{ObserverId, SceneHub, SceneObserver};

/// Tag of the root element of a scene document.
pub const SCENE_ELEMENT: &str = "scene";

/// What [`Scene::deserialize_from_document`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub entities_created: usize,
    pub entities_updated: usize,
    /// Component type names the registry could not build.
    pub skipped_components: Vec<String>,
}

/// Owning container of entities.
///
/// Entity ids are unique within a scene. Components attached to the scene's
/// entities report their changes to the scene's [`SceneHub`], which fans them
/// out to registered [`SceneObserver`]s.
pub struct Scene {
    config: SceneConfig,
    hub: Rc<SceneHub>,
    registry: Rc<ComponentRegistry>,
    entities: BTreeMap<EntityId, EntityPtr>,
    allocator: EntityAllocator,
}

impl Scene {
    /// A scene with the default component registry.
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        let context = FactoryContext::default().with_policy(config.reconcile_policy);
        Self::with_registry(config, Rc::new(ComponentRegistry::with_defaults(context)))
    }

    #[must_use]
    pub fn with_registry(config: SceneConfig, registry: Rc<ComponentRegistry>) -> Self {
        Self {
            allocator: EntityAllocator::starting_at(config.first_entity_id),
            config,
            hub: Rc::new(SceneHub::new()),
            registry,
            entities: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Rc<ComponentRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn hub(&self) -> &Rc<SceneHub> {
        &self.hub
    }

    pub fn add_observer(&self, observer: Rc<dyn SceneObserver>) -> ObserverId {
        self.hub.add_observer(observer)
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.hub.remove_observer(id)
    }

    // -- Entity lifecycle --

    /// Allocate an id no live entity uses.
    pub fn next_free_id(&mut self) -> EntityId {
        loop {
            let id = self.allocator.allocate();
            if !self.entities.contains_key(&id) {
                return id;
            }
        }
    }

    /// Create an entity with a freshly allocated id.
    pub fn create_entity(&mut self, change: AttributeChange) -> EntityPtr {
        let id = self.next_free_id();
        self.insert(id, change)
    }

    /// Create an entity with an explicit id, as replication does. `None` if
    /// the id is 0 or already in use.
    pub fn create_entity_with_id(
        &mut self,
        id: EntityId,
        change: AttributeChange,
    ) -> Option<EntityPtr> {
        if !id.is_valid() || self.entities.contains_key(&id) {
            return None;
        }
        Some(self.insert(id, change))
    }

    fn insert(&mut self, id: EntityId, change: AttributeChange) -> EntityPtr {
        let hub: Weak<SceneHub> = Rc::downgrade(&self.hub);
        let entity = Rc::new(RefCell::new(Entity::in_scene(id, Rc::clone(&self.registry), hub)));
        self.entities.insert(id, Rc::clone(&entity));
        debug!(scene = %self.config.name, entity = %id, "entity created");
        self.hub.emit_entity_created(id, change);
        entity
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<EntityPtr> {
        self.entities.get(&id).cloned()
    }

    #[must_use]
    pub fn has_entity(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Live entity ids in ascending order.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Remove an entity. Observers hear `component_removed` for each of its
    /// components and then `entity_removed`; afterwards every component is
    /// parentless. Returns `false` if there is no such entity.
    pub fn remove_entity(&mut self, id: EntityId, change: AttributeChange) -> bool {
        let Some(entity) = self.entities.remove(&id) else {
            return false;
        };
        let mut entity = entity.borrow_mut();
        for component in entity.components() {
            self.hub
                .emit_component_removed(id, &*component.borrow(), change);
        }
        self.hub.emit_entity_removed(id, change);
        entity.detach_all();
        debug!(scene = %self.config.name, entity = %id, "entity removed");
        true
    }

    // -- Documents --

    /// The whole scene as a `<scene>` element, entities in id order.
    #[must_use]
    pub fn serialize_to_document(&self) -> Element {
        let mut root =
            Element::new(SCENE_ELEMENT).with_attribute("name", self.config.name.as_str());
        for entity in self.entities.values() {
            entity.borrow().serialize_to(&mut root);
        }
        root
    }

    /// Create or update entities from a `<scene>` element.
    ///
    /// Entities are matched by id. Component elements go through
    /// get-or-create and then the component's own deserialization.
    ///
    /// # Errors
    ///
    /// Returns an error, before changing anything, if the element is not a
    /// scene or an entity element lacks a valid id.
    pub fn deserialize_from_document(
        &mut self,
        document: &Element,
        change: AttributeChange,
    ) -> Result<LoadReport, SceneError> {
        if document.tag != SCENE_ELEMENT {
            return Err(SceneError::NotAScene(document.tag.clone()));
        }
        let entries = document
            .children_named(ENTITY_ELEMENT)
            .map(|element| {
                let text = element.attribute("id").unwrap_or_default();
                match text.parse::<EntityId>() {
                    Ok(id) if id.is_valid() => Ok((id, element)),
                    _ => Err(SceneError::InvalidEntityId(text.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = LoadReport::default();
        for (id, element) in entries {
            let entity = match self.entity(id) {
                Some(entity) => {
                    report.entities_updated += 1;
                    entity
                }
                None => {
                    report.entities_created += 1;
                    self.insert(id, change)
                }
            };
            let skipped = entity.borrow_mut().deserialize_from(element, change);
            report.skipped_components.extend(skipped);
        }
        if !report.skipped_components.is_empty() {
            warn!(
                scene = %self.config.name,
                skipped = report.skipped_components.len(),
                "some components could not be created"
            );
        }
        Ok(report)
    }

    /// The scene document as XML text.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Xml`] if writing fails.
    pub fn to_xml(&self) -> Result<String, SceneError> {
        Ok(scene_xml::to_string(&self.serialize_to_document())?)
    }

    /// Parse XML text and apply it with [`Scene::deserialize_from_document`].
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Xml`] for malformed XML, or the errors of
    /// [`Scene::deserialize_from_document`].
    pub fn load_xml(
        &mut self,
        text: &str,
        change: AttributeChange,
    ) -> Result<LoadReport, SceneError> {
        let document = scene_xml::parse(text)?;
        self.deserialize_from_document(&document, change)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("config", &self.config)
            .field("entities", &self.entity_ids())
            .field("hub", &self.hub)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use scene_component::{
        Component, ComponentClass, DynamicComponent, ReconcilePolicy, SoundComponent,
    };

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl SceneObserver for Recorder {
        fn entity_created(&self, entity: EntityId, _change: AttributeChange) {
            self.events.borrow_mut().push(format!("created {entity}"));
        }

        fn entity_removed(&self, entity: EntityId, _change: AttributeChange) {
            self.events.borrow_mut().push(format!("removed {entity}"));
        }

        fn component_removed(
            &self,
            entity: EntityId,
            component: &dyn Component,
            _change: AttributeChange,
        ) {
            self.events.borrow_mut().push(format!(
                "component removed {entity} {} parent={:?}",
                component.type_name(),
                component.parent_entity()
            ));
        }
    }

    #[test]
    fn test_ids_start_at_configured_value() {
        let mut scene = Scene::new(SceneConfig::new("test").with_first_entity_id(100));
        let a = scene.create_entity(AttributeChange::Local);
        let b = scene.create_entity(AttributeChange::Local);
        assert_eq!(a.borrow().id(), EntityId(100));
        assert_eq!(b.borrow().id(), EntityId(101));
    }

    #[test]
    fn test_explicit_ids() {
        let mut scene = Scene::default();
        assert!(scene.create_entity_with_id(EntityId(2), AttributeChange::Network).is_some());
        assert!(scene.create_entity_with_id(EntityId(2), AttributeChange::Network).is_none());
        assert!(scene.create_entity_with_id(EntityId::INVALID, AttributeChange::Network).is_none());

        let first = scene.create_entity(AttributeChange::Local);
        let second = scene.create_entity(AttributeChange::Local);
        assert_eq!(first.borrow().id(), EntityId(1));
        assert_eq!(second.borrow().id(), EntityId(3));
        assert_eq!(scene.entity_ids(), vec![EntityId(1), EntityId(2), EntityId(3)]);
    }

    #[test]
    fn test_remove_entity_notifies_and_detaches() {
        let mut scene = Scene::default();
        let recorder = Rc::new(Recorder::default());
        scene.add_observer(recorder.clone());

        let entity = scene.create_entity(AttributeChange::Local);
        let id = entity.borrow().id();
        let sound = entity
            .borrow_mut()
            .get_or_create_component(SoundComponent::TYPE_NAME, AttributeChange::Local)
            .unwrap();
        drop(entity);

        assert!(scene.remove_entity(id, AttributeChange::Local));
        assert!(!scene.remove_entity(id, AttributeChange::Local));
        assert!(!scene.has_entity(id));
        assert!(sound.borrow().parent_entity().is_none());
        assert_eq!(
            *recorder.events.borrow(),
            vec![
                "created 1".to_string(),
                "component removed 1 EC_Sound parent=Some(EntityId(1))".to_string(),
                "removed 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_removed_entity_handle_keeps_no_components() {
        let mut scene = Scene::default();
        let entity = scene.create_entity(AttributeChange::Local);
        let id = entity.borrow().id();
        entity
            .borrow_mut()
            .get_or_create_component(SoundComponent::TYPE_NAME, AttributeChange::Local)
            .unwrap();
        scene.remove_entity(id, AttributeChange::Local);
        assert!(entity.borrow().components().is_empty());
    }

    #[test]
    fn test_document_round_trip() {
        let mut scene = Scene::new(SceneConfig::new("level"));
        let entity = scene.create_entity(AttributeChange::Local);
        let dynamic = entity
            .borrow_mut()
            .get_or_create_component(DynamicComponent::TYPE_NAME, AttributeChange::Local)
            .unwrap();
        {
            let mut dynamic = dynamic.borrow_mut();
            let dynamic = dynamic.downcast_mut::<DynamicComponent>().unwrap();
            dynamic.create_attribute("real", "speed").unwrap();
            dynamic
                .set_attribute_from_string("speed", "2.5", AttributeChange::Local)
                .unwrap();
        }
        let xml = scene.to_xml().unwrap();

        let mut copy = Scene::new(SceneConfig::new("copy"));
        let report = copy.load_xml(&xml, AttributeChange::Network).unwrap();
        assert_eq!(report.entities_created, 1);
        assert!(report.skipped_components.is_empty());

        let loaded = copy.entity(EntityId(1)).unwrap();
        let component = loaded.borrow().component(DynamicComponent::TYPE_NAME).unwrap();
        let component = component.borrow();
        let speed = component.attribute("speed").unwrap();
        assert_eq!(speed.get::<f32>(), Some(2.5));
        assert_eq!(speed.change(), AttributeChange::Network);

        let report = copy.load_xml(&xml, AttributeChange::Network).unwrap();
        assert_eq!(report.entities_updated, 1);
        assert_eq!(copy.entity_count(), 1);
    }

    #[test]
    fn test_reconcile_policy_reaches_created_components() {
        let mut scene = Scene::new(
            SceneConfig::default().with_reconcile_policy(ReconcilePolicy::AddedAsLocal),
        );
        let entity = scene.create_entity(AttributeChange::Local);
        let dynamic = entity
            .borrow_mut()
            .get_or_create_component(DynamicComponent::TYPE_NAME, AttributeChange::Local)
            .unwrap();
        let dynamic = dynamic.borrow();
        let dynamic = dynamic.downcast_ref::<DynamicComponent>().unwrap();
        assert_eq!(dynamic.reconcile_policy(), ReconcilePolicy::AddedAsLocal);
    }

    #[test]
    fn test_bad_documents_change_nothing() {
        let mut scene = Scene::default();
        let wrong_root = Element::new("level");
        assert!(matches!(
            scene.deserialize_from_document(&wrong_root, AttributeChange::Network),
            Err(SceneError::NotAScene(tag)) if tag == "level"
        ));

        let document = Element::new(SCENE_ELEMENT)
            .with_child(Element::new(ENTITY_ELEMENT).with_attribute("id", "5"))
            .with_child(Element::new(ENTITY_ELEMENT).with_attribute("id", "zero"));
        assert!(matches!(
            scene.deserialize_from_document(&document, AttributeChange::Network),
            Err(SceneError::InvalidEntityId(text)) if text == "zero"
        ));
        assert_eq!(scene.entity_count(), 0);

        assert!(matches!(
            scene.load_xml("<scene><entity id=\"1\">", AttributeChange::Network),
            Err(SceneError::Xml(_))
        ));
    }
}
