//! Placement transform.
//!
//! [`Transform`] holds position, euler rotation (degrees) and per-axis scale.
//! It is the payload of `transform` attributes and is written as nine comma
//! separated floats: position, rotation, scale.

use std::fmt;
use std::str::FromStr;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::text::{ParseValueError, format_floats, parse_floats};

/// Smallest magnitude substituted for a zero scale axis. Renderers reject a
/// degenerate scale, so an exact zero is never stored.
pub const MIN_SCALE: f32 = 0.000_000_1;

/// Position, rotation and scale of a scene object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    /// Position in parent space.
    pub position: Vec3,
    /// Euler rotation in degrees, applied X then Y then Z.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// The identity transform: origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Create a new transform with the given position and default rotation/scale.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn set_pos(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    pub fn set_rot(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vec3::new(x, y, z);
    }

    /// Set the scale. A zero axis is replaced by [`MIN_SCALE`].
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        let nudge = |v: f32| if v == 0.0 { MIN_SCALE } else { v };
        self.scale = Vec3::new(nudge(x), nudge(y), nudge(z));
    }

    /// The rotation as a quaternion.
    #[must_use]
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }

    /// Compute the 4×4 model matrix for this transform.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }

    /// Translate the transform by the given offset.
    #[must_use]
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.position += offset;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut values = [0.0f32; 9];
        values[0..3].copy_from_slice(&self.position.to_array());
        values[3..6].copy_from_slice(&self.rotation.to_array());
        values[6..9].copy_from_slice(&self.scale.to_array());
        f.write_str(&format_floats(&values, ","))
    }
}

impl FromStr for Transform {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = parse_floats::<9>(s)?;
        Ok(Self {
            position: Vec3::new(v[0], v[1], v[2]),
            rotation: Vec3::new(v[3], v[4], v[5]),
            scale: Vec3::new(v[6], v[7], v[8]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        let t = Transform::IDENTITY;
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_set_scale_nudges_zero_axes() {
        let mut t = Transform::IDENTITY;
        t.set_scale(0.0, 2.0, 0.0);
        assert_eq!(t.scale, Vec3::new(MIN_SCALE, 2.0, MIN_SCALE));
    }

    #[test]
    fn test_translated() {
        let t = Transform::IDENTITY.translated(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(t.position, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_text_form() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        t.set_rot(0.0, 90.0, 0.0);
        assert_eq!(t.to_string(), "1,2,3,0,90,0,1,1,1");
        assert_eq!("1,2,3,0,90,0,1,1,1".parse::<Transform>().unwrap(), t);
    }

    #[test]
    fn test_parse_rejects_short_input() {
        assert!("1,2,3".parse::<Transform>().is_err());
    }

    #[test]
    fn test_serde_json_round_trip() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let json = serde_json::to_string(&t).unwrap();
        let restored: Transform = serde_json::from_str(&json).unwrap();
        assert_eq!(t, restored);
    }
}
