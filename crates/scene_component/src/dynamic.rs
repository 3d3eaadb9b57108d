//! A component whose attribute set changes at runtime.

use std::cmp::Ordering;
use std::rc::Rc;

use scene_xml::Element;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::attribute::Attribute;
use crate::change::AttributeChange;
use crate::component::{Component, ComponentCore, ComponentEvent};
use crate::document::{AttributeRecord, read_records, write_attribute};
use crate::entity_id::EntityId;
use crate::error::AttributeError;
use crate::registry::{AttributeFactory, ComponentClass, FactoryContext};
use crate::value::{AttributeKind, AttributeValue};

/// Which change type attributes created by reconciliation are written with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcilePolicy {
    /// Always `Local`, whatever the caller passed.
    AddedAsLocal,
    /// The change type passed to the reconciliation.
    #[default]
    FollowCaller,
}

impl ReconcilePolicy {
    #[must_use]
    pub fn added_change(self, caller: AttributeChange) -> AttributeChange {
        match self {
            Self::AddedAsLocal => AttributeChange::Local,
            Self::FollowCaller => caller,
        }
    }
}

/// Outcome of [`DynamicComponent::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Attributes present on both sides, updated in place.
    pub updated: Vec<String>,
    /// Attributes created from the document.
    pub added: Vec<String>,
    /// Attributes no longer in the document.
    pub removed: Vec<String>,
    /// Records that could not be applied: unknown type, duplicate name or
    /// unparseable value.
    pub failed: Vec<String>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Schema-less component: attributes are created and removed by name and
/// type name, and deserialization reconciles the attribute set against the
/// document.
#[derive(Debug)]
pub struct DynamicComponent {
    core: ComponentCore,
    attribute_factory: Rc<AttributeFactory>,
    policy: ReconcilePolicy,
}

impl DynamicComponent {
    pub const TYPE_NAME: &'static str = "EC_DynamicComponent";

    #[must_use]
    pub fn new(attribute_factory: Rc<AttributeFactory>, policy: ReconcilePolicy) -> Self {
        Self {
            core: ComponentCore::new(Self::TYPE_NAME),
            attribute_factory,
            policy,
        }
    }

    #[must_use]
    pub fn reconcile_policy(&self) -> ReconcilePolicy {
        self.policy
    }

    pub fn set_reconcile_policy(&mut self, policy: ReconcilePolicy) {
        self.policy = policy;
    }

    /// Create an attribute of the named type and append it.
    ///
    /// Returns `None` without side effects if the name is taken or the
    /// attribute factory does not know `type_name`.
    pub fn create_attribute(&mut self, type_name: &str, name: &str) -> Option<&Attribute> {
        if self.contains_attribute(name) {
            return None;
        }
        let attribute = self.attribute_factory.create(type_name, name)?;
        Some(self.append(attribute))
    }

    /// Append an opaque `qvariant` attribute. Returns `false` if the name is
    /// taken.
    pub fn add_variant_attribute(&mut self, name: &str) -> bool {
        if self.contains_attribute(name) {
            return false;
        }
        self.append(Attribute::new(name, AttributeKind::Variant));
        true
    }

    fn append(&mut self, attribute: Attribute) -> &Attribute {
        let name = attribute.name().to_string();
        self.core.attributes.push(attribute);
        self.core.emit(&ComponentEvent::AttributeAdded(name));
        let last = self.core.attributes.len() - 1;
        &self.core.attributes[last]
    }

    /// Remove the named attribute. Returns `false`, silently, if there is
    /// none.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let Some(index) = self.core.position(name) else {
            return false;
        };
        self.core.attributes.remove(index);
        self.core.emit(&ComponentEvent::AttributeRemoved(name.to_string()));
        true
    }

    #[must_use]
    pub fn contains_attribute(&self, name: &str) -> bool {
        self.core.position(name).is_some()
    }

    /// Name of the attribute at `index` in insertion order.
    #[must_use]
    pub fn attribute_name(&self, index: usize) -> Option<&str> {
        self.core.attributes.get(index).map(Attribute::name)
    }

    /// Dynamic view of the attribute at `index`; see
    /// [`AttributeValue::to_variant`].
    #[must_use]
    pub fn attribute_value(&self, index: usize) -> Option<AttributeValue> {
        self.core.attributes.get(index).map(|a| a.value().to_variant())
    }

    /// Dynamic view of the named attribute.
    #[must_use]
    pub fn attribute_by_name(&self, name: &str) -> Option<AttributeValue> {
        self.attribute(name).map(|a| a.value().to_variant())
    }

    /// Write a dynamic value at `index`, converting through its text form.
    ///
    /// Returns `Ok(false)` if `index` is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::Parse`] if the value's text form does not
    /// parse as the attribute's type.
    pub fn set_attribute_at(
        &mut self,
        index: usize,
        value: &AttributeValue,
        change: AttributeChange,
    ) -> Result<bool, AttributeError> {
        self.set_attribute_at_from_string(index, &value.to_string(), change)
    }

    /// Name based form of [`DynamicComponent::set_attribute_at`].
    ///
    /// # Errors
    ///
    /// See [`DynamicComponent::set_attribute_at`].
    pub fn set_attribute_by_name(
        &mut self,
        name: &str,
        value: &AttributeValue,
        change: AttributeChange,
    ) -> Result<bool, AttributeError> {
        self.set_attribute_from_string(name, &value.to_string(), change)
    }

    /// Id of the owning entity, or [`EntityId::INVALID`] when detached.
    #[must_use]
    pub fn parent_entity_id(&self) -> EntityId {
        self.parent_entity().unwrap_or(EntityId::INVALID)
    }

    /// [`Component::component_changed`] with the change type given by name.
    /// Accepts `Local`, `LocalOnly` and `Network`; anything else is logged
    /// and ignored.
    pub fn component_changed_str(&mut self, change: &str) -> bool {
        match change.parse::<AttributeChange>() {
            Ok(change) if change != AttributeChange::None => {
                self.component_changed(change);
                true
            }
            _ => {
                warn!(component = Self::TYPE_NAME, change, "unsupported change type, not emitting");
                false
            }
        }
    }

    /// Same attribute names and type names, ignoring order and values.
    #[must_use]
    pub fn contains_same_attributes(&self, other: &DynamicComponent) -> bool {
        if self.attributes().len() != other.attributes().len() {
            return false;
        }
        sorted_by_name(self.attributes())
            .into_iter()
            .zip(sorted_by_name(other.attributes()))
            .all(|(a, b)| a.name() == b.name() && a.type_name() == b.type_name())
    }

    /// Make the attribute set match the component element.
    ///
    /// Attributes named on both sides are updated in place with `change`;
    /// those only in the document are created and appended in document
    /// order; those only on the component are removed. Removals are applied
    /// before additions. Returns `None` without changes if the element is
    /// for another component type.
    pub fn reconcile(
        &mut self,
        element: &Element,
        change: AttributeChange,
    ) -> Option<ReconcileReport> {
        if !self.begin_deserialization(element) {
            return None;
        }

        let mut incoming: Vec<(usize, AttributeRecord)> =
            read_records(element).into_iter().enumerate().collect();
        incoming.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name));
        let mut current: Vec<String> = self
            .attributes()
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        current.sort();

        let mut updates = Vec::new();
        let mut additions = Vec::new();
        let mut removals = Vec::new();
        let (mut i, mut j) = (0, 0);
        loop {
            match (current.get(i), incoming.get(j)) {
                (None, None) => break,
                (None, Some(record)) => {
                    additions.push(record);
                    j += 1;
                }
                (Some(name), None) => {
                    removals.push(name.clone());
                    i += 1;
                }
                (Some(name), Some(record)) => match name.as_str().cmp(record.1.name.as_str()) {
                    Ordering::Equal => {
                        updates.push(&record.1);
                        i += 1;
                        j += 1;
                    }
                    Ordering::Greater => {
                        additions.push(record);
                        j += 1;
                    }
                    Ordering::Less => {
                        removals.push(name.clone());
                        i += 1;
                    }
                },
            }
        }
        additions.sort_by_key(|(position, _)| *position);

        let mut report = ReconcileReport::default();
        for record in updates {
            match self.set_attribute_from_string(&record.name, &record.value, change) {
                Ok(_) => report.updated.push(record.name.clone()),
                Err(e) => {
                    warn!(attribute = %record.name, error = %e, "ignoring attribute value");
                    report.failed.push(record.name.clone());
                }
            }
        }
        for name in removals {
            if self.remove_attribute(&name) {
                report.removed.push(name);
            }
        }
        let added_change = self.policy.added_change(change);
        for (_, record) in additions {
            if self.create_attribute(&record.type_name, &record.name).is_none() {
                warn!(
                    attribute = %record.name,
                    type_name = %record.type_name,
                    "cannot create attribute"
                );
                report.failed.push(record.name.clone());
                continue;
            }
            match self.set_attribute_from_string(&record.name, &record.value, added_change) {
                Ok(_) => report.added.push(record.name.clone()),
                Err(e) => {
                    warn!(attribute = %record.name, error = %e, "ignoring attribute value");
                    report.added.push(record.name.clone());
                    report.failed.push(record.name.clone());
                }
            }
        }

        debug!(
            updated = report.updated.len(),
            added = report.added.len(),
            removed = report.removed.len(),
            failed = report.failed.len(),
            "reconciled dynamic component"
        );
        Some(report)
    }
}

fn sorted_by_name(attributes: &[Attribute]) -> Vec<&Attribute> {
    let mut sorted: Vec<&Attribute> = attributes.iter().collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));
    sorted
}

impl Component for DynamicComponent {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn is_serializable(&self) -> bool {
        true
    }

    fn serialize_to(&self, parent: &mut Element) {
        let element = self.begin_serialization(parent);
        for attribute in self.attributes() {
            write_attribute(
                element,
                attribute.name(),
                &attribute.to_string(),
                Some(attribute.type_name()),
            );
        }
    }

    fn deserialize_from(&mut self, element: &Element, change: AttributeChange) -> bool {
        self.reconcile(element, change).is_some()
    }
}

impl ComponentClass for DynamicComponent {
    const TYPE_NAME: &'static str = Self::TYPE_NAME;

    fn new_component(context: &FactoryContext) -> Self {
        Self::new(Rc::clone(&context.attributes), context.reconcile_policy)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::document::COMPONENT_ELEMENT;

    fn dynamic() -> DynamicComponent {
        DynamicComponent::new(
            Rc::new(AttributeFactory::with_defaults()),
            ReconcilePolicy::default(),
        )
    }

    fn with_ints(values: &[(&str, i32)]) -> DynamicComponent {
        let mut component = dynamic();
        for (name, value) in values {
            component.create_attribute("int", name).unwrap();
            component
                .set_attribute_from_string(name, &value.to_string(), AttributeChange::Local)
                .unwrap();
        }
        component.reset_change();
        component
    }

    fn document(records: &[(&str, &str, &str)]) -> Element {
        let mut element =
            Element::new(COMPONENT_ELEMENT).with_attribute("type", DynamicComponent::TYPE_NAME);
        for (name, type_name, value) in records {
            write_attribute(&mut element, name, value, Some(type_name));
        }
        element
    }

    fn ints(component: &DynamicComponent) -> Vec<(String, i32)> {
        component
            .attributes()
            .iter()
            .map(|a| (a.name().to_string(), a.get::<i32>().unwrap_or_default()))
            .collect()
    }

    #[test]
    fn test_create_attribute_appends_in_insertion_order() {
        let mut component = dynamic();
        component.create_attribute("string", "zeta").unwrap();
        component.create_attribute("bool", "alpha").unwrap();
        assert_eq!(component.attribute_name(0), Some("zeta"));
        assert_eq!(component.attribute_name(1), Some("alpha"));
    }

    #[test]
    fn test_create_attribute_rejects_duplicate_and_unknown() {
        let mut component = dynamic();
        assert!(component.create_attribute("int", "a").is_some());
        assert!(component.create_attribute("real", "a").is_none());
        assert!(component.create_attribute("matrix", "b").is_none());
        assert_eq!(component.attributes().len(), 1);
        assert_eq!(component.attribute("a").map(Attribute::kind), Some(AttributeKind::Int));
    }

    #[test]
    fn test_remove_attribute_is_idempotent() {
        let mut component = dynamic();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        component.connect(Rc::new(move |e: &ComponentEvent| sink.borrow_mut().push(e.clone())));
        component.create_attribute("int", "a").unwrap();

        assert!(component.remove_attribute("a"));
        assert!(!component.remove_attribute("a"));
        assert_eq!(
            events.borrow().as_slice(),
            &[
                ComponentEvent::AttributeAdded("a".into()),
                ComponentEvent::AttributeRemoved("a".into())
            ]
        );
    }

    #[test]
    fn test_reconcile_updates_adds_and_removes() {
        let mut component = with_ints(&[("a", 1), ("b", 2), ("d", 4)]);
        let report = component
            .reconcile(
                &document(&[("a", "int", "9"), ("c", "int", "3"), ("d", "int", "4")]),
                AttributeChange::Network,
            )
            .unwrap();

        assert_eq!(
            ints(&component),
            vec![("a".into(), 9), ("d".into(), 4), ("c".into(), 3)]
        );
        assert_eq!(report.updated, vec!["a", "d"]);
        assert_eq!(report.added, vec!["c"]);
        assert_eq!(report.removed, vec!["b"]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_reconcile_change_types() {
        let mut component = with_ints(&[("a", 1)]);
        component
            .reconcile(
                &document(&[("a", "int", "2"), ("b", "int", "5")]),
                AttributeChange::Network,
            )
            .unwrap();
        assert_eq!(component.attribute("a").unwrap().change(), AttributeChange::Network);
        assert_eq!(component.attribute("b").unwrap().change(), AttributeChange::Network);

        let mut historical = with_ints(&[("a", 1)]);
        historical.set_reconcile_policy(ReconcilePolicy::AddedAsLocal);
        historical
            .reconcile(
                &document(&[("a", "int", "2"), ("b", "int", "5")]),
                AttributeChange::Network,
            )
            .unwrap();
        assert_eq!(historical.attribute("a").unwrap().change(), AttributeChange::Network);
        assert_eq!(historical.attribute("b").unwrap().change(), AttributeChange::Local);
    }

    #[test]
    fn test_reconcile_adds_in_document_order() {
        let mut component = dynamic();
        component
            .reconcile(
                &document(&[("z", "string", "last"), ("m", "bool", "true"), ("a", "real", "0.5")]),
                AttributeChange::Local,
            )
            .unwrap();
        let names: Vec<&str> = component.attributes().iter().map(Attribute::name).collect();
        assert_eq!(names, vec!["z", "m", "a"]);
        assert_eq!(component.attribute("a").and_then(|a| a.get::<f32>()), Some(0.5));
    }

    #[test]
    fn test_reconcile_empty_document_clears() {
        let mut component = with_ints(&[("a", 1), ("b", 2)]);
        let report = component.reconcile(&document(&[]), AttributeChange::Local).unwrap();
        assert!(component.attributes().is_empty());
        assert_eq!(report.removed, vec!["a", "b"]);
    }

    #[test]
    fn test_reconcile_reports_bad_records() {
        let mut component = with_ints(&[("a", 1)]);
        let report = component
            .reconcile(
                &document(&[("a", "int", "oops"), ("b", "nosuchtype", "1"), ("c", "int", "x")]),
                AttributeChange::Local,
            )
            .unwrap();
        assert_eq!(component.attribute("a").and_then(|a| a.get::<i32>()), Some(1));
        assert!(!component.contains_attribute("b"));
        assert_eq!(component.attribute("c").and_then(|a| a.get::<i32>()), Some(0));
        assert_eq!(report.failed, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reconcile_ignores_other_component_type() {
        let mut component = with_ints(&[("a", 1)]);
        let element = Element::new(COMPONENT_ELEMENT).with_attribute("type", "EC_Sound");
        assert!(component.reconcile(&element, AttributeChange::Local).is_none());
        assert!(!component.deserialize_from(&element, AttributeChange::Local));
        assert!(component.contains_attribute("a"));
    }

    #[test]
    fn test_serialize_then_reconcile_into_empty_component() {
        let mut source = dynamic();
        source.set_name("data");
        source.create_attribute("vector3df", "pos").unwrap();
        source
            .set_attribute_from_string("pos", "1 2 3", AttributeChange::Local)
            .unwrap();
        source.create_attribute("assetreference", "mesh").unwrap();
        source
            .set_attribute_from_string("mesh", "tree.mesh,OgreMesh", AttributeChange::Local)
            .unwrap();
        let element = source.to_element().unwrap();
        assert_eq!(element.children[0].attribute("type"), Some("vector3df"));

        let mut target = dynamic();
        assert!(target.deserialize_from(&element, AttributeChange::Network));
        assert_eq!(target.name(), "data");
        assert!(target.contains_same_attributes(&source));
        assert_eq!(
            target.attribute("mesh").map(ToString::to_string).as_deref(),
            Some("tree.mesh,OgreMesh")
        );
    }

    #[test]
    fn test_contains_same_attributes_ignores_order_and_values() {
        let mut a = dynamic();
        a.create_attribute("int", "x").unwrap();
        a.create_attribute("string", "y").unwrap();
        let mut b = dynamic();
        b.create_attribute("string", "y").unwrap();
        b.create_attribute("int", "x").unwrap();
        b.set_attribute_from_string("x", "7", AttributeChange::Local).unwrap();
        assert!(a.contains_same_attributes(&b));

        b.remove_attribute("x");
        b.create_attribute("real", "x").unwrap();
        assert!(!a.contains_same_attributes(&b));
        b.remove_attribute("x");
        assert!(!a.contains_same_attributes(&b));
    }

    #[test]
    fn test_variant_accessors() {
        let mut component = dynamic();
        component.create_attribute("bool", "flag").unwrap();
        component.create_attribute("int", "count").unwrap();
        assert!(component.add_variant_attribute("blob"));
        assert!(!component.add_variant_attribute("blob"));

        assert_eq!(component.attribute_value(0), Some(AttributeValue::Bool(false)));
        assert_eq!(component.attribute_value(1), Some(AttributeValue::String("0".into())));
        assert_eq!(component.attribute_value(9), None);

        component
            .set_attribute_at(1, &AttributeValue::String("12".into()), AttributeChange::Local)
            .unwrap();
        assert_eq!(component.attribute("count").and_then(|a| a.get::<i32>()), Some(12));

        component
            .set_attribute_by_name("blob", &AttributeValue::Real(1.5), AttributeChange::Local)
            .unwrap();
        assert_eq!(
            component.attribute_by_name("blob"),
            Some(AttributeValue::Variant("1.5".into()))
        );
        assert_eq!(
            component.set_attribute_at(7, &AttributeValue::Bool(true), AttributeChange::Local),
            Ok(false)
        );
    }

    #[test]
    fn test_component_changed_str() {
        let mut component = dynamic();
        assert!(component.component_changed_str("LocalOnly"));
        assert_eq!(component.change(), AttributeChange::LocalOnly);
        assert!(!component.component_changed_str("Sideways"));
        assert!(!component.component_changed_str("None"));
        assert_eq!(component.change(), AttributeChange::LocalOnly);
    }

    #[test]
    fn test_parent_entity_id_defaults_to_invalid() {
        let component = dynamic();
        assert_eq!(component.parent_entity_id(), EntityId::INVALID);
    }
}
