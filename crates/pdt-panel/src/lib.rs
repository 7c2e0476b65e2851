//! The inspector panel.
//!
//! [`InspectorStore`] is the panel's state model, holding the mirrored scene
//! tree and everything the panel shows about it.
//! It reaches the page only through a [`Transport`], which in the extension
//! is the host's message channel to the active tab's relay.

pub mod store;
pub mod transport;

pub use store::{ConnectionStatus, InspectorStore, PanelState};
pub use transport::{TabTransport, Transport, TransportError};
