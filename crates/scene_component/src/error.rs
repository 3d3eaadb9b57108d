//! Attribute-level error types.

use crate::value::AttributeKind;

/// Errors reported by attribute mutation. The attribute is left unchanged
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributeError {
    /// The text could not be parsed as the attribute's declared type.
    #[error("cannot parse '{text}' as {kind}: {reason}")]
    Parse {
        kind: AttributeKind,
        text: String,
        reason: String,
    },

    /// A typed setter was called with a value of another type.
    #[error("attribute '{name}' holds {expected}, not {found}")]
    TypeMismatch {
        name: String,
        expected: AttributeKind,
        found: AttributeKind,
    },
}

impl AttributeError {
    pub(crate) fn parse(kind: AttributeKind, text: &str, reason: impl ToString) -> Self {
        Self::Parse {
            kind,
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }
}

