//! Named, typed value slots.
//!
//! An [`Attribute`] lives inside exactly one component's attribute list and
//! is never moved to another. Mutation is only reachable through the owning
//! component, which is what lets every successful write bubble an
//! attribute-changed notification upward.

use std::fmt;

use crate::change::AttributeChange;
use crate::error::AttributeError;
use crate::value::{AttributeKind, AttributeType, AttributeValue};

/// A named, typed value plus its pending-change marker.
#[derive(Debug, PartialEq)]
pub struct Attribute {
    name: String,
    value: AttributeValue,
    change: AttributeChange,
}

impl Attribute {
    /// A new attribute holding the default value of `kind`.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self::with_value(name, kind.default_value())
    }

    /// A new attribute holding `value`; its kind is the value's kind.
    #[must_use]
    pub fn with_value(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            change: AttributeChange::None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        self.value.kind()
    }

    /// The type name written into documents.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    #[must_use]
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// The pending change marker.
    #[must_use]
    pub fn change(&self) -> AttributeChange {
        self.change
    }

    /// Typed read; `None` if the attribute holds another type.
    #[must_use]
    pub fn get<T: AttributeType>(&self) -> Option<T> {
        T::from_value(&self.value)
    }

    /// Parse `text` with this attribute's declared type and store it.
    ///
    /// On failure the value and change marker are left untouched.
    pub(crate) fn from_string(
        &mut self,
        text: &str,
        change: AttributeChange,
    ) -> Result<(), AttributeError> {
        self.value = AttributeValue::parse(self.kind(), text)?;
        self.change = change;
        Ok(())
    }

    /// Store `value`, which must be of this attribute's kind.
    pub(crate) fn set_value(
        &mut self,
        value: AttributeValue,
        change: AttributeChange,
    ) -> Result<(), AttributeError> {
        if value.kind() != self.kind() {
            return Err(AttributeError::TypeMismatch {
                name: self.name.clone(),
                expected: self.kind(),
                found: value.kind(),
            });
        }
        self.value = value;
        self.change = change;
        Ok(())
    }

    pub(crate) fn reset_change(&mut self) {
        self.change = AttributeChange::None;
    }
}

/// The value's canonical text form.
impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
