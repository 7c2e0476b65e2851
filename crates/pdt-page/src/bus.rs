//! Typed channels between the relay and the page context.

use pdt_core::{CommandEnvelope, ResponseEnvelope};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Scripts the relay can inject into the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageScript {
    /// Starts polling for a published scene.
    Detection,
    /// Installs the command router.
    SceneTree,
}

/// Relay → page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Inject(PageScript),
    Command(CommandEnvelope),
}

/// Page → relay.
#[derive(Debug, Clone, PartialEq)]
pub enum PageNotice {
    Detected,
    Response(ResponseEnvelope),
}

/// The page's end of the bus.
#[derive(Debug)]
pub struct PagePort {
    pub events: UnboundedReceiver<PageEvent>,
    pub notices: UnboundedSender<PageNotice>,
}

/// The relay's end of the bus.
#[derive(Debug)]
pub struct RelayPort {
    pub events: UnboundedSender<PageEvent>,
    pub notices: UnboundedReceiver<PageNotice>,
}

pub fn page_bus() -> (PagePort, RelayPort) {
    let (event_tx, event_rx) = unbounded_channel();
    let (notice_tx, notice_rx) = unbounded_channel();
    (
        PagePort {
            events: event_rx,
            notices: notice_tx,
        },
        RelayPort {
            events: event_tx,
            notices: notice_rx,
        },
    )
}
