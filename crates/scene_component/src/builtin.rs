//! Static components with a fixed attribute set.

use crate::attribute::Attribute;
use crate::component::{Component, ComponentCore};
use crate::registry::{ComponentClass, FactoryContext};

macro_rules! static_component {
    ($(#[$meta:meta])* $ty:ident, $type_name:literal) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $ty {
            core: ComponentCore,
        }

        impl Component for $ty {
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

        impl ComponentClass for $ty {
            const TYPE_NAME: &'static str = $type_name;

            fn new_component(_context: &FactoryContext) -> Self {
                Self::new()
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

static_component!(
    /// Human readable name and description of an entity.
    NameComponent,
    "EC_Name"
);

impl NameComponent {
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: ComponentCore::new(Self::TYPE_NAME)
                .with_attribute(Attribute::with_value("name", ""))
                .with_attribute(Attribute::with_value("description", "")),
        }
    }
}

static_component!(
    /// A positional sound source.
    SoundComponent,
    "EC_Sound"
);

impl SoundComponent {
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: ComponentCore::new(Self::TYPE_NAME)
                .with_attribute(Attribute::with_value("soundId", ""))
                .with_attribute(Attribute::with_value("soundInnerRadius", 0.0f32))
                .with_attribute(Attribute::with_value("soundOuterRadius", 20.0f32))
                .with_attribute(Attribute::with_value("soundGain", 1.0f32))
                .with_attribute(Attribute::with_value("loopSound", false))
                .with_attribute(Attribute::with_value("triggerSound", false)),
        }
    }
}

static_component!(
    /// Marks an entity as reacting to pointer hover and click.
    TouchableComponent,
    "EC_Touchable"
);

impl TouchableComponent {
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: ComponentCore::new(Self::TYPE_NAME)
                .with_attribute(Attribute::with_value("materialName", "")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::AttributeChange;

    #[test]
    fn test_sound_defaults() {
        let sound = SoundComponent::new();
        assert_eq!(sound.type_name(), "EC_Sound");
        assert_eq!(sound.attributes().len(), 6);
        assert_eq!(sound.attribute("soundGain").and_then(|a| a.get::<f32>()), Some(1.0));
        assert_eq!(sound.attribute("loopSound").map(Attribute::type_name), Some("bool"));
    }

    #[test]
    fn test_static_round_trip_through_document() {
        let mut name = NameComponent::new();
        name.set_attribute_from_string("name", "Lamp", AttributeChange::Local)
            .unwrap();
        name.set_attribute_from_string("description", "lights the hall", AttributeChange::Local)
            .unwrap();
        let element = name.to_element().unwrap();

        let mut copy = NameComponent::new();
        assert!(copy.deserialize_from(&element, AttributeChange::Network));
        assert_eq!(
            copy.attribute("description").and_then(|a| a.get::<String>()).as_deref(),
            Some("lights the hall")
        );
    }

    #[test]
    fn test_static_components_cannot_read_each_other() {
        let element = TouchableComponent::new().to_element().unwrap();
        let mut sound = SoundComponent::new();
        assert!(!sound.deserialize_from(&element, AttributeChange::Network));
    }
}
