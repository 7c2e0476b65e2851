//! The relay between panel and page.
//!
//! Requests from the panel are answered here when the page cannot answer
//! them yet. Everything else is forwarded over the page bus under a fresh
//! correlation id and awaited with a timeout.

use crate::error::RelayError;
use pdt_core::{
    CommandEnvelope, PendingRequests, RelayReply, RelayRequest, Response, ResponseEnvelope,
};
use pdt_page::{PageEvent, PageNotice, PageScript, RelayPort};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Error text returned for scene commands sent before a scene was found.
pub const NOT_DETECTED: &str = "scene instance not detected";

#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// How long a forwarded command may wait for the page to answer.
    pub request_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
struct Shared {
    detected: AtomicBool,
    pending: PendingRequests<Response>,
}

/// Relay between one page and the inspector panel.
///
/// Dropping the bridge stops the notice pump; requests still waiting then
/// fail with their timeout.
#[derive(Debug)]
pub struct RelayBridge {
    events: UnboundedSender<PageEvent>,
    shared: Arc<Shared>,
    pump: JoinHandle<()>,
}

impl RelayBridge {
    /// Attach to the page end of `port` and inject the detection script.
    /// Must be called from inside a tokio runtime.
    pub fn start(port: RelayPort, config: RelayConfig) -> Self {
        let RelayPort { events, notices } = port;
        let shared = Arc::new(Shared {
            detected: AtomicBool::new(false),
            pending: PendingRequests::new(config.request_timeout),
        });
        let pump = tokio::spawn(pump(notices, events.clone(), shared.clone()));
        let bridge = Self {
            events,
            shared,
            pump,
        };
        if bridge.inject(PageScript::Detection).is_err() {
            log::warn!("page closed before detection could start");
        }
        bridge
    }

    pub fn is_detected(&self) -> bool {
        self.shared.detected.load(Ordering::Acquire)
    }

    /// Requests forwarded to the page that have not been answered yet.
    pub fn outstanding(&self) -> usize {
        self.shared.pending.len()
    }

    /// Decode a panel message and handle it.
    pub async fn handle_value(&self, message: Value) -> Result<RelayReply, RelayError> {
        let request = RelayRequest::from_value(message).inspect_err(|err| {
            log::warn!("rejected panel message: {err}");
        })?;
        self.handle(request).await
    }

    pub async fn handle(&self, request: RelayRequest) -> Result<RelayReply, RelayError> {
        let command = match request {
            RelayRequest::DetectPaperJs => {
                let detected = self.is_detected();
                if !detected {
                    self.inject(PageScript::Detection)?;
                }
                return Ok(RelayReply::Probe { detected });
            }
            RelayRequest::Command(command) => command,
        };

        if !self.is_detected() {
            log::debug!("{} before detection", command.action());
            return Ok(RelayReply::Response(Response::Error(NOT_DETECTED.to_string())));
        }

        let pending = self.shared.pending.begin()?;
        let envelope = CommandEnvelope {
            id: pending.id().clone(),
            command,
        };
        log::debug!("forward {} [{}]", envelope.command.action(), envelope.id);
        if self.events.send(PageEvent::Command(envelope)).is_err() {
            self.shared.pending.cancel(pending.id());
            return Err(RelayError::PageClosed);
        }

        let response = self.shared.pending.wait(pending).await?;
        Ok(RelayReply::Response(response))
    }

    fn inject(&self, script: PageScript) -> Result<(), RelayError> {
        self.events
            .send(PageEvent::Inject(script))
            .map_err(|_| RelayError::PageClosed)
    }
}

impl Drop for RelayBridge {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn pump(
    mut notices: UnboundedReceiver<PageNotice>,
    events: UnboundedSender<PageEvent>,
    shared: Arc<Shared>,
) {
    while let Some(notice) = notices.recv().await {
        match notice {
            PageNotice::Detected => {
                if shared.detected.load(Ordering::Acquire) {
                    continue;
                }
                // The router must be queued ahead of any command sent once
                // `detected` reads true.
                log::debug!("scene detected, installing router");
                if events.send(PageEvent::Inject(PageScript::SceneTree)).is_err() {
                    break;
                }
                shared.detected.store(true, Ordering::Release);
            }
            PageNotice::Response(ResponseEnvelope { id, response }) => {
                if !shared.pending.complete(&id, response) {
                    log::warn!("dropping response to unknown request {id}");
                }
            }
        }
    }
    log::debug!("page notices closed");
}
