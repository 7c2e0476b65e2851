//! Error types shared across the inspector contexts.

use thiserror::Error;

/// A node id that could not be parsed into a [`crate::path::NodePath`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("node id is empty")]
    Empty,
    #[error("node id `{0}` does not start at `root`")]
    MissingRoot(String),
    #[error("node id `{id}` has a non-numeric segment `{segment}`")]
    BadSegment { id: String, segment: String },
}

/// A property write rejected by the live scene.
///
/// Writes are validated before they touch the item, so an `Err` always
/// means the item still holds its previous value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    #[error("`{property}` is not a writable property of {kind}")]
    UnknownProperty { property: String, kind: &'static str },
    #[error("`{property}` expects {expected}, got {found}")]
    InvalidValue {
        property: String,
        expected: &'static str,
        found: String,
    },
    #[error("cannot parse color from {0}")]
    InvalidColor(String),
    #[error("{kind} has no bounds to move or fit")]
    NoBounds { kind: &'static str },
}

impl WriteError {
    pub fn invalid(property: &str, expected: &'static str, found: &serde_json::Value) -> Self {
        Self::InvalidValue {
            property: property.to_string(),
            expected,
            found: found.to_string(),
        }
    }
}

/// Failure to decode a message crossing a context boundary.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message has no `action` field")]
    MissingAction,
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("malformed `{action}` message: {source}")]
    Malformed {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}
