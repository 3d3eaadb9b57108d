//! # scene_math
//!
//! Value types for scene attributes. Re-exports [`glam`] for linear algebra
//! and defines the scene-specific [`Color`] and [`Transform`] types.
//!
//! Every type here has a canonical text form (see [`text`]) used when an
//! attribute is written into or read from a scene document.

pub mod color;
pub mod text;
pub mod transform;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Mat4, Quat, Vec3};

/// Three-component float vector carried by `vector3df` attributes.
pub type Vector3 = Vec3;

/// Rotation quaternion carried by `quaternion` attributes.
pub type Quaternion = Quat;

pub use color::Color;
pub use text::ParseValueError;
pub use transform::Transform;
