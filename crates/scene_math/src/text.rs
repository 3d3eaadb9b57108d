//! Canonical text forms for the math types.
//!
//! Vectors, quaternions and colors are written as space separated floats.
//! Parsing is lenient about the separator: any mix of whitespace and commas
//! is accepted, so `"1 2 3"`, `"1,2,3"` and `"1, 2, 3"` are equivalent.
//!
//! Floats are written with Rust's shortest round-trip formatting, so
//! `parse(format(v)) == v` holds for every finite value.

use glam::{Quat, Vec3};
use thiserror::Error;

/// Failure to parse a value from its text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseValueError {
    /// A token could not be read as a number.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// The text held the wrong number of elements.
    #[error("expected {expected} values, found {found}")]
    WrongCount { expected: usize, found: usize },
}

/// Parse exactly `N` floats separated by whitespace and/or commas.
///
/// # Errors
///
/// Returns [`ParseValueError::WrongCount`] if the element count differs and
/// [`ParseValueError::InvalidNumber`] if any element is not a float.
pub fn parse_floats<const N: usize>(text: &str) -> Result<[f32; N], ParseValueError> {
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() != N {
        return Err(ParseValueError::WrongCount {
            expected: N,
            found: tokens.len(),
        });
    }

    let mut out = [0.0f32; N];
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = token
            .parse()
            .map_err(|_| ParseValueError::InvalidNumber(token.to_string()))?;
    }
    Ok(out)
}

/// Join floats with the given separator.
#[must_use]
pub fn format_floats(values: &[f32], separator: &str) -> String {
    values
        .iter()
        .map(f32::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// `x y z`
#[must_use]
pub fn format_vector3(v: Vec3) -> String {
    format_floats(&v.to_array(), " ")
}

/// Parse the [`format_vector3`] form.
///
/// # Errors
///
/// See [`parse_floats`].
pub fn parse_vector3(text: &str) -> Result<Vec3, ParseValueError> {
    parse_floats::<3>(text).map(Vec3::from_array)
}

/// `w x y z`, scalar part first.
#[must_use]
pub fn format_quaternion(q: Quat) -> String {
    format_floats(&[q.w, q.x, q.y, q.z], " ")
}

/// Parse the [`format_quaternion`] form. The quaternion is not normalised.
///
/// # Errors
///
/// See [`parse_floats`].
pub fn parse_quaternion(text: &str) -> Result<Quat, ParseValueError> {
    let [w, x, y, z] = parse_floats::<4>(text)?;
    Ok(Quat::from_xyzw(x, y, z, w))
}
