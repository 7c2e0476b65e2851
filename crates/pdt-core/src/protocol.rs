//! Wire protocol between the inspector panel, the relay, and the page.
//!
//! ```text
//! Request:  { id, action: "GET_SCENE_TREE" | "SELECT_NODE" | "TOGGLE_NODE_VISIBILITY"
//!                       | "UPDATE_NODE_PROPERTY", nodeId?, property?, value? }
//! Response: { id, response: { sceneTree } | { node } | { error } }
//! Probe:    { action: "DETECT_PAPER_JS" } → { detected } | { error }
//! ```
//!
//! Actions are a closed enum decoded once at the relay boundary; anything
//! else is rejected there instead of travelling further.

use crate::error::ProtocolError;
use crate::serialize::SceneNode;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Action tag of the liveness probe.
pub const PROBE_ACTION: &str = "DETECT_PAPER_JS";

/// Correlation token pairing a response with its request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scene command executed in the page context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    GetSceneTree,
    #[serde(rename_all = "camelCase")]
    SelectNode { node_id: String },
    #[serde(rename_all = "camelCase")]
    ToggleNodeVisibility { node_id: String },
    #[serde(rename_all = "camelCase")]
    UpdateNodeProperty {
        node_id: String,
        property: String,
        #[serde(default)]
        value: Value,
    },
}

impl Command {
    /// Every action tag a `Command` can carry.
    pub const ACTIONS: [&'static str; 4] = [
        "GET_SCENE_TREE",
        "SELECT_NODE",
        "TOGGLE_NODE_VISIBILITY",
        "UPDATE_NODE_PROPERTY",
    ];

    pub fn action(&self) -> &'static str {
        match self {
            Command::GetSceneTree => Self::ACTIONS[0],
            Command::SelectNode { .. } => Self::ACTIONS[1],
            Command::ToggleNodeVisibility { .. } => Self::ACTIONS[2],
            Command::UpdateNodeProperty { .. } => Self::ACTIONS[3],
        }
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            Command::GetSceneTree => None,
            Command::SelectNode { node_id }
            | Command::ToggleNodeVisibility { node_id }
            | Command::UpdateNodeProperty { node_id, .. } => Some(node_id),
        }
    }
}

/// A command stamped with its correlation id, as dispatched into the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CorrelationId,
    #[serde(flatten)]
    pub command: Command,
}

/// Result of a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Response {
    SceneTree(SceneNode),
    Node(SceneNode),
    Error(String),
}

/// A response paired with the id of the command that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: CorrelationId,
    pub response: Response,
}

/// A message from the panel to the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayRequest {
    /// Ask whether a scene instance has been detected in the page.
    DetectPaperJs,
    Command(Command),
}

impl RelayRequest {
    /// Decode a panel message, rejecting unknown or malformed actions.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let action = value
            .get("action")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingAction)?
            .to_string();

        if action == PROBE_ACTION {
            return Ok(RelayRequest::DetectPaperJs);
        }
        if !Command::ACTIONS.contains(&action.as_str()) {
            return Err(ProtocolError::UnknownAction(action));
        }
        serde_json::from_value(value)
            .map(RelayRequest::Command)
            .map_err(|source| ProtocolError::Malformed { action, source })
    }

    pub fn action(&self) -> &'static str {
        match self {
            RelayRequest::DetectPaperJs => PROBE_ACTION,
            RelayRequest::Command(command) => command.action(),
        }
    }
}

impl From<Command> for RelayRequest {
    fn from(command: Command) -> Self {
        RelayRequest::Command(command)
    }
}

impl Serialize for RelayRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RelayRequest::DetectPaperJs => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("action", PROBE_ACTION)?;
                map.end()
            }
            RelayRequest::Command(command) => command.serialize(serializer),
        }
    }
}

/// What the relay hands back to the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayReply {
    Probe { detected: bool },
    Response(Response),
}
