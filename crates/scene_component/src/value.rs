//! Attribute value types.
//!
//! [`AttributeValue`] is a closed sum over every supported attribute type,
//! with [`AttributeValue::Variant`] as the opaque fallback for values whose
//! structure the scene does not interpret. [`AttributeKind`] is the matching
//! type tag; its [`type_name`](AttributeKind::type_name) is what documents
//! store in an attribute's `type` field.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use scene_math::text::{format_quaternion, format_vector3, parse_quaternion, parse_vector3};
use scene_math::{Color, Quat, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::AttributeError;

/// Type tag of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    Bool,
    Int,
    UInt,
    Real,
    String,
    Vector3,
    Quaternion,
    Color,
    AssetReference,
    Transform,
    Variant,
}

impl AttributeKind {
    /// Every kind, in declaration order.
    pub const ALL: [AttributeKind; 11] = [
        Self::Bool,
        Self::Int,
        Self::UInt,
        Self::Real,
        Self::String,
        Self::Vector3,
        Self::Quaternion,
        Self::Color,
        Self::AssetReference,
        Self::Transform,
        Self::Variant,
    ];

    /// The type name written into documents.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Real => "real",
            Self::String => "string",
            Self::Vector3 => "vector3df",
            Self::Quaternion => "quaternion",
            Self::Color => "color",
            Self::AssetReference => "assetreference",
            Self::Transform => "transform",
            Self::Variant => "qvariant",
        }
    }

    /// Look a kind up by its document type name.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }

    /// The value a freshly created attribute of this kind holds.
    #[must_use]
    pub fn default_value(self) -> AttributeValue {
        match self {
            Self::Bool => AttributeValue::Bool(false),
            Self::Int => AttributeValue::Int(0),
            Self::UInt => AttributeValue::UInt(0),
            Self::Real => AttributeValue::Real(0.0),
            Self::String => AttributeValue::String(String::new()),
            Self::Vector3 => AttributeValue::Vector3(Vec3::ZERO),
            Self::Quaternion => AttributeValue::Quaternion(Quat::IDENTITY),
            Self::Color => AttributeValue::Color(Color::default()),
            Self::AssetReference => AttributeValue::AssetReference(AssetReference::default()),
            Self::Transform => AttributeValue::Transform(Transform::IDENTITY),
            Self::Variant => AttributeValue::Variant(String::new()),
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Reference to an asset by id, with an optional asset type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetReference {
    pub id: String,
    pub asset_type: String,
}

impl AssetReference {
    #[must_use]
    pub fn new(id: impl Into<String>, asset_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            asset_type: asset_type.into(),
        }
    }
}

/// Written as `id,type`, or just `id` when the type is empty. Commas and
/// backslashes in the id are escaped with a backslash.
impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.id.chars() {
            if matches!(c, ',' | '\\') {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        if !self.asset_type.is_empty() {
            write!(f, ",{}", self.asset_type)?;
        }
        Ok(())
    }
}

impl FromStr for AssetReference {
    type Err = Infallible;

    /// The type starts after the first unescaped comma.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut id = String::with_capacity(s.len());
        let mut chars = s.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        id.push(escaped);
                    }
                }
                ',' => return Ok(Self::new(id, &s[i + 1..])),
                _ => id.push(c),
            }
        }
        Ok(Self::new(id, ""))
    }
}

/// The value held by an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Real(f32),
    String(String),
    Vector3(Vec3),
    Quaternion(Quat),
    Color(Color),
    AssetReference(AssetReference),
    Transform(Transform),
    /// Opaque value kept in its text form.
    Variant(String),
}

impl AttributeValue {
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Bool(_) => AttributeKind::Bool,
            Self::Int(_) => AttributeKind::Int,
            Self::UInt(_) => AttributeKind::UInt,
            Self::Real(_) => AttributeKind::Real,
            Self::String(_) => AttributeKind::String,
            Self::Vector3(_) => AttributeKind::Vector3,
            Self::Quaternion(_) => AttributeKind::Quaternion,
            Self::Color(_) => AttributeKind::Color,
            Self::AssetReference(_) => AttributeKind::AssetReference,
            Self::Transform(_) => AttributeKind::Transform,
            Self::Variant(_) => AttributeKind::Variant,
        }
    }

    /// Parse `text` as a value of `kind`.
    ///
    /// Numeric kinds ignore surrounding whitespace; `string`, `qvariant` and
    /// `assetreference` keep the text verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::Parse`] if the text is not a valid `kind`.
    pub fn parse(kind: AttributeKind, text: &str) -> Result<Self, AttributeError> {
        let err = |reason: &dyn fmt::Display| AttributeError::parse(kind, text, reason);
        let trimmed = text.trim();
        Ok(match kind {
            AttributeKind::Bool => {
                Self::Bool(parse_bool(trimmed).ok_or_else(|| err(&"expected true or false"))?)
            }
            AttributeKind::Int => Self::Int(trimmed.parse().map_err(|e| err(&e))?),
            AttributeKind::UInt => Self::UInt(trimmed.parse().map_err(|e| err(&e))?),
            AttributeKind::Real => Self::Real(trimmed.parse().map_err(|e| err(&e))?),
            AttributeKind::String => Self::String(text.to_string()),
            AttributeKind::Vector3 => Self::Vector3(parse_vector3(text).map_err(|e| err(&e))?),
            AttributeKind::Quaternion => {
                Self::Quaternion(parse_quaternion(text).map_err(|e| err(&e))?)
            }
            AttributeKind::Color => Self::Color(text.parse().map_err(|e| err(&e))?),
            AttributeKind::AssetReference => {
                let Ok(reference) = text.parse::<AssetReference>();
                Self::AssetReference(reference)
            }
            AttributeKind::Transform => Self::Transform(text.parse().map_err(|e| err(&e))?),
            AttributeKind::Variant => Self::Variant(text.to_string()),
        })
    }

    /// The dynamic view handed out by index/name based accessors: booleans
    /// and reals stay typed, opaque values stay as they are, everything else
    /// becomes its text form.
    #[must_use]
    pub fn to_variant(&self) -> AttributeValue {
        match self {
            Self::Bool(_) | Self::Real(_) | Self::Variant(_) => self.clone(),
            other => Self::String(other.to_string()),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

/// Canonical text form, the left inverse of [`AttributeValue::parse`].
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::String(v) | Self::Variant(v) => f.write_str(v),
            Self::Vector3(v) => f.write_str(&format_vector3(*v)),
            Self::Quaternion(q) => f.write_str(&format_quaternion(*q)),
            Self::Color(c) => write!(f, "{c}"),
            Self::AssetReference(r) => write!(f, "{r}"),
            Self::Transform(t) => write!(f, "{t}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Rust types that map one-to-one onto an [`AttributeKind`], enabling typed
/// access to attributes.
pub trait AttributeType: Sized {
    const KIND: AttributeKind;

    /// Extract the value if it holds this type.
    fn from_value(value: &AttributeValue) -> Option<Self>;

    fn into_value(self) -> AttributeValue;
}

macro_rules! attribute_type {
    ($ty:ty, $variant:ident) => {
        impl AttributeType for $ty {
            const KIND: AttributeKind = AttributeKind::$variant;

            fn from_value(value: &AttributeValue) -> Option<Self> {
                match value {
                    AttributeValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_value(self) -> AttributeValue {
                AttributeValue::$variant(self)
            }
        }

        impl From<$ty> for AttributeValue {
            fn from(value: $ty) -> Self {
                AttributeValue::$variant(value)
            }
        }
    };
}

attribute_type!(bool, Bool);
attribute_type!(i32, Int);
attribute_type!(u32, UInt);
attribute_type!(f32, Real);
attribute_type!(String, String);
attribute_type!(Vec3, Vector3);
attribute_type!(Quat, Quaternion);
attribute_type!(Color, Color);
attribute_type!(AssetReference, AssetReference);
attribute_type!(Transform, Transform);
