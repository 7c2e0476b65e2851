//! The panel's message channel to the inspected tab.

use pdt_core::{RelayReply, RelayRequest};
use pdt_relay::{RelayBridge, RelayError};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no active tab")]
    NoActiveTab,
    #[error("cannot encode request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("cannot decode reply: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Sends one request to the active tab and resolves with its reply.
pub trait Transport {
    fn send(
        &self,
        request: RelayRequest,
    ) -> impl Future<Output = Result<RelayReply, TransportError>> + Send;
}

/// Transport to the relay of whichever tab is active.
///
/// Messages cross as JSON values in both directions, the way they would
/// between extension contexts.
#[derive(Debug, Clone, Default)]
pub struct TabTransport {
    tab: Option<Arc<RelayBridge>>,
}

impl TabTransport {
    pub fn new(tab: Arc<RelayBridge>) -> Self {
        Self { tab: Some(tab) }
    }

    pub fn detached() -> Self {
        Self::default()
    }
}

impl Transport for TabTransport {
    async fn send(&self, request: RelayRequest) -> Result<RelayReply, TransportError> {
        let tab = self.tab.clone().ok_or(TransportError::NoActiveTab)?;
        let message = serde_json::to_value(&request).map_err(TransportError::Encode)?;
        let reply = tab.handle_value(message).await?;
        let wire = serde_json::to_value(&reply).map_err(TransportError::Encode)?;
        serde_json::from_value(wire).map_err(TransportError::Decode)
    }
}
