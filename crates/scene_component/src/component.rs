//! The [`Component`] trait and the state every component shares.
//!
//! A component is an ordered list of [`Attribute`]s plus identity (type name
//! and optional instance name). Components are handed around as
//! [`ComponentPtr`]; an entity owns the strong handles of the components
//! attached to it, and a component knows its entity only by id through a
//! [`ParentLink`].
//!
//! ## Change propagation
//!
//! A successful attribute write calls the attached scene's [`ChangeSink`]
//! (when the owning entity belongs to a scene) and then the component's own
//! listeners, synchronously and in that order, before returning.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use scene_xml::Element;
use tracing::warn;

use crate::attribute::Attribute;
use crate::change::AttributeChange;
use crate::document::{COMPONENT_ELEMENT, read_attribute, write_attribute};
use crate::entity_id::EntityId;
use crate::error::AttributeError;
use crate::value::{AttributeType, AttributeValue};

/// Shared, mutable handle to a component.
pub type ComponentPtr = Rc<RefCell<dyn Component>>;

/// Wrap a concrete component in a [`ComponentPtr`].
pub fn into_ptr<C: Component>(component: C) -> ComponentPtr {
    Rc::new(RefCell::new(component))
}

// ── Scene seam ──────────────────────────────────────────────────────────────

/// Receiver of change notifications from attached components. Implemented
/// by the scene's notification hub.
pub trait ChangeSink {
    fn component_changed(
        &self,
        entity: EntityId,
        component: &dyn Component,
        change: AttributeChange,
    );

    fn attribute_changed(
        &self,
        entity: EntityId,
        component: &dyn Component,
        attribute: &Attribute,
        change: AttributeChange,
    );
}

struct NoScene;

impl ChangeSink for NoScene {
    fn component_changed(&self, _: EntityId, _: &dyn Component, _: AttributeChange) {}

    fn attribute_changed(
        &self,
        _: EntityId,
        _: &dyn Component,
        _: &Attribute,
        _: AttributeChange,
    ) {
    }
}

/// Non-owning back reference from a component to its entity and, through
/// it, to the scene that entity belongs to.
#[derive(Clone)]
pub struct ParentLink {
    entity: EntityId,
    sink: Weak<dyn ChangeSink>,
}

impl ParentLink {
    #[must_use]
    pub fn new(entity: EntityId, sink: Weak<dyn ChangeSink>) -> Self {
        Self { entity, sink }
    }

    /// A link to an entity that is not part of any scene.
    #[must_use]
    pub fn without_scene(entity: EntityId) -> Self {
        let sink: Weak<dyn ChangeSink> = Weak::<NoScene>::new();
        Self { entity, sink }
    }

    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// The scene sink, if the entity still belongs to a live scene.
    #[must_use]
    pub fn sink(&self) -> Option<Rc<dyn ChangeSink>> {
        self.sink.upgrade()
    }
}

impl fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentLink")
            .field("entity", &self.entity)
            .field("in_scene", &(self.sink.strong_count() > 0))
            .finish()
    }
}

// ── Component-local notifications ───────────────────────────────────────────

/// Notifications a component raises about itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentEvent {
    /// `component_changed` was called.
    Changed(AttributeChange),
    /// An attribute was written.
    AttributeChanged { name: String, change: AttributeChange },
    /// The component was attached to an entity.
    ParentSet(EntityId),
    /// The component lost its entity.
    ParentDetached,
    /// The instance name changed.
    NameChanged(String),
    /// A dynamic attribute was created.
    AttributeAdded(String),
    /// A dynamic attribute was removed.
    AttributeRemoved(String),
}

/// Callback connected to a component's notifications.
pub type ComponentListener = Rc<dyn Fn(&ComponentEvent)>;

/// Handle returned by [`Component::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

// ── Shared state ────────────────────────────────────────────────────────────

/// State common to every component.
pub struct ComponentCore {
    type_name: &'static str,
    name: String,
    pub(crate) attributes: Vec<Attribute>,
    parent: Option<ParentLink>,
    change: AttributeChange,
    listeners: Vec<(ListenerId, ComponentListener)>,
    next_listener: u64,
}

impl ComponentCore {
    #[must_use]
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            name: String::new(),
            attributes: Vec::new(),
            parent: None,
            change: AttributeChange::None,
            listeners: Vec::new(),
            next_listener: 1,
        }
    }

    /// Declare an attribute. A name that is already declared is ignored, so
    /// attribute names stay unique.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.push_attribute(attribute);
        self
    }

    pub(crate) fn push_attribute(&mut self, attribute: Attribute) -> bool {
        if self.position(attribute.name()).is_some() {
            return false;
        }
        self.attributes.push(attribute);
        true
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    pub(crate) fn emit(&self, event: &ComponentEvent) {
        // Snapshot so a listener may connect or disconnect while being called.
        let listeners: Vec<ComponentListener> =
            self.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for ComponentCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCore")
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("parent", &self.parent)
            .field("change", &self.change)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ── Upcasting ───────────────────────────────────────────────────────────────

/// Conversions every component gets for free; lets provided trait methods
/// hand `self` to code that takes `&dyn Component`, and lets callers
/// downcast to a concrete component type.
pub trait AsComponent {
    fn as_component(&self) -> &dyn Component;
    fn as_component_mut(&mut self) -> &mut dyn Component;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AsComponent for T {
    fn as_component(&self) -> &dyn Component {
        self
    }

    fn as_component_mut(&mut self) -> &mut dyn Component {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ── The trait ───────────────────────────────────────────────────────────────

/// One facet of an entity: an ordered set of attributes plus identity.
///
/// Implementors supply [`core`](Component::core) /
/// [`core_mut`](Component::core_mut) and, where they differ from the
/// defaults, [`is_serializable`](Component::is_serializable),
/// [`serialize_to`](Component::serialize_to) and
/// [`deserialize_from`](Component::deserialize_from). Everything else is
/// provided.
pub trait Component: AsComponent + 'static {
    fn core(&self) -> &ComponentCore;

    fn core_mut(&mut self) -> &mut ComponentCore;

    /// Whether the component takes part in document (de)serialization.
    fn is_serializable(&self) -> bool {
        false
    }

    /// Append this component's element to `parent`. No-op when not
    /// serializable.
    fn serialize_to(&self, parent: &mut Element) {
        if !self.is_serializable() {
            return;
        }
        let element = self.begin_serialization(parent);
        for attribute in self.attributes() {
            write_attribute(element, attribute.name(), &attribute.to_string(), None);
        }
    }

    /// Update existing attributes from a component element.
    ///
    /// Returns `false` without touching anything when the component is not
    /// serializable or the element is for another component type. Attributes
    /// without a record in the element keep their value; records whose value
    /// does not parse are logged and skipped.
    fn deserialize_from(&mut self, element: &Element, change: AttributeChange) -> bool {
        if !self.is_serializable() || !self.begin_deserialization(element) {
            return false;
        }
        for index in 0..self.attributes().len() {
            let name = self.attributes()[index].name().to_string();
            let Some(text) = read_attribute(element, &name) else {
                continue;
            };
            if let Err(e) = self.set_attribute_at_from_string(index, text, change) {
                warn!(
                    component = self.type_name(),
                    attribute = %name,
                    error = %e,
                    "ignoring attribute value"
                );
            }
        }
        true
    }

    // -- Identity --

    fn type_name(&self) -> &'static str {
        self.core().type_name
    }

    /// Instance name; empty when unnamed.
    fn name(&self) -> &str {
        &self.core().name
    }

    /// Set the instance name. Notifies only if the name actually changes.
    fn set_name(&mut self, name: &str) {
        if self.core().name == name {
            return;
        }
        self.core_mut().name = name.to_string();
        self.core().emit(&ComponentEvent::NameChanged(name.to_string()));
    }

    // -- Parent --

    fn parent_entity(&self) -> Option<EntityId> {
        self.core().parent.as_ref().map(ParentLink::entity)
    }

    fn parent_link(&self) -> Option<&ParentLink> {
        self.core().parent.as_ref()
    }

    /// Attach to (`Some`) or detach from (`None`) an entity. Does not touch
    /// the attributes.
    fn set_parent_entity(&mut self, parent: Option<ParentLink>) {
        let event = match &parent {
            Some(link) => ComponentEvent::ParentSet(link.entity()),
            None => ComponentEvent::ParentDetached,
        };
        self.core_mut().parent = parent;
        self.core().emit(&event);
    }

    // -- Attributes --

    fn attributes(&self) -> &[Attribute] {
        &self.core().attributes
    }

    /// Linear lookup by name.
    fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.core().attributes.iter().find(|a| a.name() == name)
    }

    fn attribute_at(&self, index: usize) -> Option<&Attribute> {
        self.core().attributes.get(index)
    }

    /// Parse `text` into the attribute called `name` and notify.
    ///
    /// Returns `Ok(false)` if there is no such attribute.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::Parse`] if the text does not parse; nothing
    /// changes and nothing is notified.
    fn set_attribute_from_string(
        &mut self,
        name: &str,
        text: &str,
        change: AttributeChange,
    ) -> Result<bool, AttributeError> {
        match self.core().position(name) {
            Some(index) => self.set_attribute_at_from_string(index, text, change),
            None => Ok(false),
        }
    }

    /// Index based form of [`Component::set_attribute_from_string`].
    ///
    /// # Errors
    ///
    /// See [`Component::set_attribute_from_string`].
    fn set_attribute_at_from_string(
        &mut self,
        index: usize,
        text: &str,
        change: AttributeChange,
    ) -> Result<bool, AttributeError> {
        let Some(attribute) = self.core_mut().attributes.get_mut(index) else {
            return Ok(false);
        };
        attribute.from_string(text, change)?;
        notify_attribute_changed(self.as_component(), index, change);
        Ok(true)
    }

    /// Store a value of the attribute's own type and notify.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::TypeMismatch`] if `value` is of another type.
    fn set_attribute_value(
        &mut self,
        name: &str,
        value: AttributeValue,
        change: AttributeChange,
    ) -> Result<bool, AttributeError> {
        let Some(index) = self.core().position(name) else {
            return Ok(false);
        };
        self.core_mut().attributes[index].set_value(value, change)?;
        notify_attribute_changed(self.as_component(), index, change);
        Ok(true)
    }

    /// Typed form of [`Component::set_attribute_value`].
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::TypeMismatch`] if the attribute is not a `T`.
    fn set_attribute<T: AttributeType>(
        &mut self,
        name: &str,
        value: T,
        change: AttributeChange,
    ) -> Result<bool, AttributeError>
    where
        Self: Sized,
    {
        self.set_attribute_value(name, value.into_value(), change)
    }

    /// Raise the attribute-changed notifications for `name` without writing
    /// it. Returns `false` if there is no such attribute.
    fn attribute_changed(&self, name: &str, change: AttributeChange) -> bool {
        match self.core().position(name) {
            Some(index) => {
                notify_attribute_changed(self.as_component(), index, change);
                true
            }
            None => false,
        }
    }

    // -- Component-level change --

    /// The last change type passed to [`Component::component_changed`].
    fn change(&self) -> AttributeChange {
        self.core().change
    }

    /// Record `change` as the component's change type and notify the scene
    /// (if attached) and the component's listeners.
    fn component_changed(&mut self, change: AttributeChange) {
        self.core_mut().change = change;
        let core = self.core();
        if let Some(link) = &core.parent
            && let Some(sink) = link.sink()
        {
            sink.component_changed(link.entity(), self.as_component(), change);
        }
        core.emit(&ComponentEvent::Changed(change));
    }

    /// Clear every attribute's change marker, then the component's own.
    fn reset_change(&mut self) {
        let core = self.core_mut();
        for attribute in &mut core.attributes {
            attribute.reset_change();
        }
        core.change = AttributeChange::None;
    }

    // -- Listeners --

    fn connect(&mut self, listener: ComponentListener) -> ListenerId {
        let core = self.core_mut();
        let id = ListenerId(core.next_listener);
        core.next_listener += 1;
        core.listeners.push((id, listener));
        id
    }

    fn disconnect(&mut self, id: ListenerId) -> bool {
        let listeners = &mut self.core_mut().listeners;
        let before = listeners.len();
        listeners.retain(|(l, _)| *l != id);
        listeners.len() != before
    }

    // -- Document helpers --

    /// Append an empty component element carrying `type` and, when set,
    /// `name`; returns it for the attribute records.
    fn begin_serialization<'a>(&self, parent: &'a mut Element) -> &'a mut Element {
        let mut element = Element::new(COMPONENT_ELEMENT).with_attribute("type", self.type_name());
        if !self.name().is_empty() {
            element.set_attribute("name", self.name());
        }
        parent.append_child(element)
    }

    /// Check the element is for this component type and adopt its name.
    fn begin_deserialization(&mut self, element: &Element) -> bool {
        if element.attribute("type") != Some(self.type_name()) {
            return false;
        }
        self.set_name(element.attribute("name").unwrap_or_default());
        true
    }

    /// Serialize into a standalone element; `None` when not serializable.
    fn to_element(&self) -> Option<Element> {
        let mut scratch = Element::default();
        self.serialize_to(&mut scratch);
        scratch.children.pop()
    }
}

fn notify_attribute_changed(component: &dyn Component, index: usize, change: AttributeChange) {
    let core = component.core();
    let Some(attribute) = core.attributes.get(index) else {
        return;
    };
    if let Some(link) = &core.parent
        && let Some(sink) = link.sink()
    {
        sink.attribute_changed(link.entity(), component, attribute, change);
    }
    core.emit(&ComponentEvent::AttributeChanged {
        name: attribute.name().to_string(),
        change,
    });
}

impl dyn Component {
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("type_name", &self.type_name())
            .field("name", &self.name())
            .field("attributes", &self.attributes().len())
            .field("parent", &self.parent_entity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use scene_math::Vec3;

    use super::*;
    use crate::value::AttributeKind;

    struct Widget {
        core: ComponentCore,
    }

    impl Widget {
        fn new() -> Self {
            Self {
                core: ComponentCore::new("EC_Widget")
                    .with_attribute(Attribute::new("position", AttributeKind::Vector3))
                    .with_attribute(Attribute::with_value("label", "start"))
                    .with_attribute(Attribute::with_value("count", 1i32)),
            }
        }
    }

    impl Component for Widget {
        fn core(&self) -> &ComponentCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ComponentCore {
            &mut self.core
        }

        fn is_serializable(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: RefCell<Vec<(EntityId, String, Option<String>, AttributeChange)>>,
    }

    impl ChangeSink for RecordingSink {
        fn component_changed(
            &self,
            entity: EntityId,
            component: &dyn Component,
            change: AttributeChange,
        ) {
            self.calls
                .borrow_mut()
                .push((entity, component.type_name().to_string(), None, change));
        }

        fn attribute_changed(
            &self,
            entity: EntityId,
            component: &dyn Component,
            attribute: &Attribute,
            change: AttributeChange,
        ) {
            self.calls.borrow_mut().push((
                entity,
                component.type_name().to_string(),
                Some(attribute.name().to_string()),
                change,
            ));
        }
    }

    fn record_events(component: &mut dyn Component) -> Rc<RefCell<Vec<ComponentEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        component.connect(Rc::new(move |e: &ComponentEvent| sink.borrow_mut().push(e.clone())));
        events
    }

    #[test]
    fn test_duplicate_declaration_is_ignored() {
        let core = ComponentCore::new("EC_Widget")
            .with_attribute(Attribute::with_value("a", 1i32))
            .with_attribute(Attribute::with_value("a", "again"));
        assert_eq!(core.attributes.len(), 1);
        assert_eq!(core.attributes[0].kind(), AttributeKind::Int);
    }

    #[test]
    fn test_attribute_lookup_by_name() {
        let widget = Widget::new();
        assert_eq!(widget.attribute("label").map(Attribute::type_name), Some("string"));
        assert!(widget.attribute("missing").is_none());
        assert_eq!(widget.attribute_at(0).map(Attribute::name), Some("position"));
    }

    #[test]
    fn test_attribute_write_notifies_sink_then_listeners() {
        let sink = Rc::new(RecordingSink::default());
        let weak: Weak<dyn ChangeSink> = Rc::downgrade(&sink) as Weak<dyn ChangeSink>;
        let mut widget = Widget::new();
        widget.set_parent_entity(Some(ParentLink::new(EntityId(7), weak)));
        let events = record_events(&mut widget);

        let written = widget
            .set_attribute_from_string("position", "1 2 3", AttributeChange::Local)
            .unwrap();

        assert!(written);
        assert_eq!(
            sink.calls.borrow().as_slice(),
            &[(
                EntityId(7),
                "EC_Widget".to_string(),
                Some("position".to_string()),
                AttributeChange::Local
            )]
        );
        assert_eq!(
            events.borrow().as_slice(),
            &[ComponentEvent::AttributeChanged {
                name: "position".into(),
                change: AttributeChange::Local
            }]
        );
        // Attribute writes leave the component-level marker alone.
        assert_eq!(widget.change(), AttributeChange::None);
        assert_eq!(
            widget.attribute("position").and_then(|a| a.get::<Vec3>()),
            Some(Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn test_attribute_changed_notifies_without_writing() {
        let sink = Rc::new(RecordingSink::default());
        let weak: Weak<dyn ChangeSink> = Rc::downgrade(&sink) as Weak<dyn ChangeSink>;
        let mut widget = Widget::new();
        widget.set_parent_entity(Some(ParentLink::new(EntityId(3), weak)));
        let events = record_events(&mut widget);

        assert!(widget.attribute_changed("label", AttributeChange::Network));

        assert_eq!(
            sink.calls.borrow().as_slice(),
            &[(
                EntityId(3),
                "EC_Widget".to_string(),
                Some("label".to_string()),
                AttributeChange::Network
            )]
        );
        assert_eq!(
            events.borrow().as_slice(),
            &[ComponentEvent::AttributeChanged {
                name: "label".into(),
                change: AttributeChange::Network
            }]
        );
        assert_eq!(
            widget.attribute("label").and_then(|a| a.get::<String>()),
            Some("start".to_string())
        );

        assert!(!widget.attribute_changed("missing", AttributeChange::Network));
        assert_eq!(sink.calls.borrow().len(), 1);
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn test_unparseable_write_is_reported_and_silent() {
        let mut widget = Widget::new();
        let events = record_events(&mut widget);
        let result = widget.set_attribute_from_string("count", "many", AttributeChange::Local);
        assert!(result.is_err());
        assert!(events.borrow().is_empty());
        assert_eq!(widget.attribute("count").and_then(|a| a.get::<i32>()), Some(1));
    }

    #[test]
    fn test_missing_attribute_write_is_not_an_error() {
        let mut widget = Widget::new();
        assert_eq!(
            widget.set_attribute_from_string("nope", "1", AttributeChange::Local),
            Ok(false)
        );
    }

    #[test]
    fn test_typed_setter_checks_type() {
        let mut widget = Widget::new();
        assert_eq!(widget.set_attribute("count", 5i32, AttributeChange::Local), Ok(true));
        assert!(widget.set_attribute("count", true, AttributeChange::Local).is_err());
        assert_eq!(widget.attribute("count").and_then(|a| a.get::<i32>()), Some(5));
    }

    #[test]
    fn test_component_changed_without_scene_still_notifies_listeners() {
        let mut widget = Widget::new();
        widget.set_parent_entity(Some(ParentLink::without_scene(EntityId(3))));
        let events = record_events(&mut widget);
        widget.component_changed(AttributeChange::LocalOnly);
        assert_eq!(widget.change(), AttributeChange::LocalOnly);
        assert_eq!(
            events.borrow().as_slice(),
            &[ComponentEvent::Changed(AttributeChange::LocalOnly)]
        );
    }

    #[test]
    fn test_reset_change_clears_attributes_then_component() {
        let mut widget = Widget::new();
        widget
            .set_attribute_from_string("label", "x", AttributeChange::Network)
            .unwrap();
        widget.component_changed(AttributeChange::Network);
        widget.reset_change();
        assert_eq!(widget.change(), AttributeChange::None);
        assert!(widget.attributes().iter().all(|a| a.change() == AttributeChange::None));
    }

    #[test]
    fn test_set_name_notifies_only_on_change() {
        let mut widget = Widget::new();
        let events = record_events(&mut widget);
        widget.set_name("main");
        widget.set_name("main");
        assert_eq!(
            events.borrow().as_slice(),
            &[ComponentEvent::NameChanged("main".into())]
        );
    }

    #[test]
    fn test_parent_attach_and_detach_events() {
        let mut widget = Widget::new();
        let events = record_events(&mut widget);
        widget.set_parent_entity(Some(ParentLink::without_scene(EntityId(9))));
        assert_eq!(widget.parent_entity(), Some(EntityId(9)));
        widget.set_parent_entity(None);
        assert_eq!(widget.parent_entity(), None);
        assert_eq!(
            events.borrow().as_slice(),
            &[ComponentEvent::ParentSet(EntityId(9)), ComponentEvent::ParentDetached]
        );
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let mut widget = Widget::new();
        let events = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&events);
        let id = widget.connect(Rc::new(move |_: &ComponentEvent| *counter.borrow_mut() += 1));
        widget.component_changed(AttributeChange::Local);
        assert!(widget.disconnect(id));
        assert!(!widget.disconnect(id));
        widget.component_changed(AttributeChange::Local);
        assert_eq!(*events.borrow(), 1);
    }

    #[test]
    fn test_serialize_writes_name_and_values_without_types() {
        let mut widget = Widget::new();
        widget.set_name("main");
        let element = widget.to_element().unwrap();
        assert_eq!(element.attribute("type"), Some("EC_Widget"));
        assert_eq!(element.attribute("name"), Some("main"));
        assert_eq!(element.children.len(), 3);
        assert_eq!(read_attribute(&element, "position"), Some("0 0 0"));
        assert_eq!(element.children[0].attribute("type"), None);
    }

    #[test]
    fn test_deserialize_updates_present_records_only() {
        let mut source = Widget::new();
        source
            .set_attribute_from_string("label", "loaded", AttributeChange::Local)
            .unwrap();
        let mut element = source.to_element().unwrap();
        element.children.retain(|c| c.attribute("name") != Some("count"));
        element.set_attribute("name", "copy");

        let mut target = Widget::new();
        target
            .set_attribute_from_string("count", "42", AttributeChange::Local)
            .unwrap();
        assert!(target.deserialize_from(&element, AttributeChange::Network));

        assert_eq!(target.name(), "copy");
        let label = target.attribute("label").unwrap();
        assert_eq!(label.get::<String>().as_deref(), Some("loaded"));
        assert_eq!(label.change(), AttributeChange::Network);
        assert_eq!(target.attribute("count").and_then(|a| a.get::<i32>()), Some(42));
    }

    #[test]
    fn test_deserialize_ignores_other_component_types() {
        let mut widget = Widget::new();
        let element = Element::new(COMPONENT_ELEMENT)
            .with_attribute("type", "EC_Other")
            .with_attribute("name", "x");
        assert!(!widget.deserialize_from(&element, AttributeChange::Network));
        assert_eq!(widget.name(), "");
    }

    #[test]
    fn test_downcast() {
        let ptr = into_ptr(Widget::new());
        assert!(ptr.borrow().is::<Widget>());
        assert!(ptr.borrow().downcast_ref::<Widget>().is_some());
    }
}
