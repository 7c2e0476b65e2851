//! Panel state and the operations that fold relay replies into it.

use crate::transport::{Transport, TransportError};
use pdt_core::{Command, RelayReply, RelayRequest, Response, SceneNode};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Connection status shown in the panel header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Waiting,
    Connecting,
    Connected,
    /// The host could not reach the tab.
    Unreachable(String),
    NotDetected,
    RefreshFailed,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Waiting => f.write_str("Waiting for connection..."),
            ConnectionStatus::Connecting => f.write_str("Connecting..."),
            ConnectionStatus::Connected => f.write_str("Connected"),
            ConnectionStatus::Unreachable(reason) => {
                write!(f, "Unable to connect ({reason})")
            }
            ConnectionStatus::NotDetected => f.write_str("No scene detected in this page"),
            ConnectionStatus::RefreshFailed => f.write_str("Failed to fetch the scene tree"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    pub connected: bool,
    pub connection_status: ConnectionStatus,
    /// Replaced wholesale on every refresh.
    pub scene_tree: Option<SceneNode>,
    pub selected_node: Option<SceneNode>,
    /// Expanded rows, by node id. Ids are positional, so this can point at
    /// different nodes after the tree is restructured.
    pub expanded_node_ids: BTreeSet<String>,
    /// Last error worth a toast.
    pub notice: Option<String>,
}

/// The panel's state model, driving the page through `T`.
#[derive(Debug)]
pub struct InspectorStore<T> {
    transport: T,
    state: PanelState,
}

impl<T: Transport> InspectorStore<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: PanelState::default(),
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn dismiss_notice(&mut self) -> Option<String> {
        self.state.notice.take()
    }

    /// Probe the tab and, if a scene is there, load its tree.
    pub async fn initialize(&mut self) {
        self.state.connection_status = ConnectionStatus::Connecting;

        match self.transport.send(RelayRequest::DetectPaperJs).await {
            Err(TransportError::NoActiveTab) => {
                log::debug!("initialize: no active tab");
            }
            Err(err) => {
                log::warn!("probe failed: {err}");
                self.state.connected = false;
                self.state.connection_status = ConnectionStatus::Unreachable(err.to_string());
            }
            Ok(RelayReply::Probe { detected: true }) => {
                self.state.connected = true;
                self.state.connection_status = ConnectionStatus::Connected;
                self.refresh_scene_tree().await;
            }
            Ok(reply) => {
                log::debug!("probe negative: {reply:?}");
                self.state.connected = false;
                self.state.connection_status = ConnectionStatus::NotDetected;
            }
        }
    }

    pub async fn refresh_scene_tree(&mut self) {
        match self.transport.send(Command::GetSceneTree.into()).await {
            Ok(RelayReply::Response(Response::SceneTree(tree))) => {
                self.state.scene_tree = Some(tree);
                self.state.connected = true;
            }
            Err(TransportError::NoActiveTab) => {
                log::debug!("refresh: no active tab");
            }
            other => {
                log::warn!("scene tree refresh failed: {other:?}");
                self.state.connected = false;
                self.state.connection_status = ConnectionStatus::RefreshFailed;
            }
        }
    }

    pub async fn select_node(&mut self, node_id: &str) {
        let command = Command::SelectNode {
            node_id: node_id.to_string(),
        };
        if let Some(Response::Node(node)) = self.request(command).await {
            self.state.selected_node = Some(node);
        }
    }

    pub async fn toggle_node_visibility(&mut self, node_id: &str) {
        let command = Command::ToggleNodeVisibility {
            node_id: node_id.to_string(),
        };
        if let Some(Response::SceneTree(tree)) = self.request(command).await {
            self.state.scene_tree = Some(tree);
        }
    }

    /// Write a property; on success the tree is refreshed so the edit shows
    /// everywhere it is visible.
    pub async fn update_node_property(&mut self, node_id: &str, property: &str, value: Value) {
        let command = Command::UpdateNodeProperty {
            node_id: node_id.to_string(),
            property: property.to_string(),
            value,
        };
        if let Some(Response::Node(node)) = self.request(command).await {
            self.state.selected_node = Some(node);
            self.refresh_scene_tree().await;
        }
    }

    /// Expand or collapse a tree row. Local only.
    pub fn toggle_node_expanded(&mut self, node_id: &str) {
        if !self.state.expanded_node_ids.remove(node_id) {
            self.state.expanded_node_ids.insert(node_id.to_string());
        }
    }

    /// Send a scene command. Failures become a notice and yield `None`;
    /// the connection status is left alone.
    async fn request(&mut self, command: Command) -> Option<Response> {
        let action = command.action();
        let message = match self.transport.send(command.into()).await {
            Ok(RelayReply::Response(Response::Error(message))) => message,
            Ok(RelayReply::Response(response)) => return Some(response),
            Ok(reply) => format!("unexpected reply {reply:?}"),
            Err(TransportError::NoActiveTab) => return None,
            Err(err) => err.to_string(),
        };
        log::warn!("{action} failed: {message}");
        self.state.notice = Some(message);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records what was sent.
    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<Result<RelayReply, TransportError>>>,
        sent: Mutex<Vec<RelayRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<RelayReply, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                sent: Mutex::default(),
            }
        }

        fn actions(&self) -> Vec<&'static str> {
            self.sent.lock().unwrap().iter().map(|r| r.action()).collect()
        }
    }

    impl Transport for Scripted {
        async fn send(&self, request: RelayRequest) -> Result<RelayReply, TransportError> {
            self.sent.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TransportError::NoActiveTab))
        }
    }

    fn node(id: &str, kind: &str, children: Vec<SceneNode>) -> SceneNode {
        SceneNode {
            id: id.into(),
            name: String::new(),
            kind: kind.into(),
            children,
            properties: Default::default(),
            visible: true,
            selected: false,
        }
    }

    fn tree() -> SceneNode {
        node("root", "Project", vec![node("root_0", "Layer", Vec::new())])
    }

    fn ok(response: Response) -> Result<RelayReply, TransportError> {
        Ok(RelayReply::Response(response))
    }

    #[tokio::test]
    async fn initialize_connects_and_loads_tree() {
        let mut store = InspectorStore::new(Scripted::new(vec![
            Ok(RelayReply::Probe { detected: true }),
            ok(Response::SceneTree(tree())),
        ]));
        assert_eq!(store.state().connection_status, ConnectionStatus::Waiting);
        store.initialize().await;

        assert!(store.state().connected);
        assert_eq!(store.state().connection_status, ConnectionStatus::Connected);
        assert_eq!(store.state().scene_tree, Some(tree()));
        assert_eq!(
            store.transport().actions(),
            vec!["DETECT_PAPER_JS", "GET_SCENE_TREE"]
        );
    }

    #[tokio::test]
    async fn initialize_reports_missing_scene_and_errors() {
        let mut store =
            InspectorStore::new(Scripted::new(vec![Ok(RelayReply::Probe { detected: false })]));
        store.initialize().await;
        assert!(!store.state().connected);
        assert_eq!(store.state().connection_status, ConnectionStatus::NotDetected);
        assert_eq!(store.transport().actions(), vec!["DETECT_PAPER_JS"]);

        let mut store = InspectorStore::new(Scripted::new(vec![Err(TransportError::Relay(
            pdt_relay::RelayError::PageClosed,
        ))]));
        store.initialize().await;
        assert_eq!(
            store.state().connection_status,
            ConnectionStatus::Unreachable("page context is gone".into())
        );
        assert_eq!(
            store.state().connection_status.to_string(),
            "Unable to connect (page context is gone)"
        );

        // Without a tab nothing happens past "connecting".
        let mut store = InspectorStore::new(Scripted::default());
        store.initialize().await;
        assert_eq!(store.state().connection_status, ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn failed_refresh_disconnects() {
        let mut store = InspectorStore::new(Scripted::new(vec![
            ok(Response::SceneTree(tree())),
            ok(Response::Error("boom".into())),
        ]));
        store.refresh_scene_tree().await;
        assert!(store.state().connected);

        store.refresh_scene_tree().await;
        assert!(!store.state().connected);
        assert_eq!(store.state().connection_status, ConnectionStatus::RefreshFailed);
        // The last good tree stays on screen.
        assert_eq!(store.state().scene_tree, Some(tree()));
    }

    #[tokio::test]
    async fn select_and_toggle_fold_replies() {
        let mut selected = node("root_0", "Layer", Vec::new());
        selected.selected = true;
        let mut hidden = tree();
        hidden.children[0].visible = false;

        let mut store = InspectorStore::new(Scripted::new(vec![
            ok(Response::Node(selected.clone())),
            ok(Response::SceneTree(hidden.clone())),
            ok(Response::Error("nope".into())),
        ]));
        store.select_node("root_0").await;
        assert_eq!(store.state().selected_node, Some(selected.clone()));

        store.toggle_node_visibility("root_0").await;
        assert_eq!(store.state().scene_tree, Some(hidden));

        store.select_node("root_9").await;
        assert_eq!(store.state().selected_node, Some(selected));
        assert_eq!(store.dismiss_notice(), Some("nope".to_string()));
        assert_eq!(store.state().notice, None);
    }

    #[tokio::test]
    async fn update_refreshes_on_success_only() {
        let updated = node("root_0", "Layer", Vec::new());
        let mut store = InspectorStore::new(Scripted::new(vec![
            ok(Response::Node(updated.clone())),
            ok(Response::SceneTree(tree())),
            ok(Response::Error("`fillColor` expects a color".into())),
        ]));

        store
            .update_node_property("root_0", "opacity", json!(0.5))
            .await;
        assert_eq!(store.state().selected_node, Some(updated));
        assert_eq!(store.state().scene_tree, Some(tree()));

        store
            .update_node_property("root_0", "fillColor", json!("??"))
            .await;
        assert_eq!(
            store.state().notice.as_deref(),
            Some("`fillColor` expects a color")
        );
        assert!(store.state().connected);
        assert_eq!(
            store.transport().actions(),
            vec![
                "UPDATE_NODE_PROPERTY",
                "GET_SCENE_TREE",
                "UPDATE_NODE_PROPERTY"
            ]
        );
    }

    #[test]
    fn expanded_rows_toggle_locally() {
        let mut store = InspectorStore::new(Scripted::default());
        store.toggle_node_expanded("root_0");
        store.toggle_node_expanded("root_1");
        store.toggle_node_expanded("root_0");
        assert_eq!(
            store.state().expanded_node_ids.iter().collect::<Vec<_>>(),
            vec!["root_1"]
        );
        assert!(store.transport().actions().is_empty());
    }
}
