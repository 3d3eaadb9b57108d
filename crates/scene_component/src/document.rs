//! Component layout inside a scene document.
//!
//! ```text
//! <component type="EC_Sound" name="optional">
//!   <attribute name="soundGain" value="1"/>
//!   <attribute name="extra" value="x" type="string"/>   (dynamic components)
//! </component>
//! ```

use scene_xml::Element;

/// Tag of a component element.
pub const COMPONENT_ELEMENT: &str = "component";

/// Tag of an attribute record inside a component element.
pub const ATTRIBUTE_ELEMENT: &str = "attribute";

/// Append an attribute record to a component element. `type_name` is only
/// written for components whose attribute set is not fixed.
pub fn write_attribute(
    component: &mut Element,
    name: &str,
    value: &str,
    type_name: Option<&str>,
) {
    let mut record = Element::new(ATTRIBUTE_ELEMENT)
        .with_attribute("name", name)
        .with_attribute("value", value);
    if let Some(type_name) = type_name {
        record.set_attribute("type", type_name);
    }
    component.children.push(record);
}

fn find_record<'a>(component: &'a Element, name: &str) -> Option<&'a Element> {
    component
        .children_named(ATTRIBUTE_ELEMENT)
        .find(|record| record.attribute("name") == Some(name))
}

/// The `value` of the first record called `name`.
#[must_use]
pub fn read_attribute<'a>(component: &'a Element, name: &str) -> Option<&'a str> {
    find_record(component, name).and_then(|record| record.attribute("value"))
}

/// The `type` of the first record called `name`.
#[must_use]
pub fn read_attribute_type<'a>(component: &'a Element, name: &str) -> Option<&'a str> {
    find_record(component, name).and_then(|record| record.attribute("type"))
}

/// One attribute record as read from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    pub name: String,
    pub type_name: String,
    pub value: String,
}

/// Every attribute record of a component element, in document order.
/// Missing fields read as empty strings.
#[must_use]
pub fn read_records(component: &Element) -> Vec<AttributeRecord> {
    component
        .children_named(ATTRIBUTE_ELEMENT)
        .map(|record| AttributeRecord {
            name: record.attribute("name").unwrap_or_default().to_string(),
            type_name: record.attribute("type").unwrap_or_default().to_string(),
            value: record.attribute("value").unwrap_or_default().to_string(),
        })
        .collect()
}
