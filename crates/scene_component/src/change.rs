//! Change classification carried by every mutation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why a mutation happened, which decides whether it is re-broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeChange {
    /// No pending change (rest state).
    #[default]
    None,
    /// Originated locally; replicate to network peers.
    Local,
    /// Originated locally; never sent to network peers.
    LocalOnly,
    /// Arrived from a network peer; not re-sent.
    Network,
}

impl AttributeChange {
    /// Returns `true` if a change of this kind should be sent to peers.
    #[must_use]
    pub const fn is_replicated(self) -> bool {
        matches!(self, Self::Local)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Local => "Local",
            Self::LocalOnly => "LocalOnly",
            Self::Network => "Network",
        }
    }
}

impl fmt::Display for AttributeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a change-type string is not one of the four tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported change type '{0}'")]
pub struct UnknownChangeType(pub String);

impl FromStr for AttributeChange {
    type Err = UnknownChangeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Local" => Ok(Self::Local),
            "LocalOnly" => Ok(Self::LocalOnly),
            "Network" => Ok(Self::Network),
            other => Err(UnknownChangeType(other.to_string())),
        }
    }
}
