//! Wires one page, its relay, and the inspector panel in-process.

use anyhow::{Context, Result};
use pdt_core::{Project, SceneHandle};
use pdt_page::{DetectorConfig, PageContext, PageWindow, page_bus};
use pdt_panel::{ConnectionStatus, InspectorStore, TabTransport};
use pdt_relay::{RelayBridge, RelayConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub detector: DetectorConfig,
    pub relay: RelayConfig,
    /// Scene the host page publishes, if any.
    pub scene: Option<Project>,
}

pub struct Session {
    pub store: InspectorStore<TabTransport>,
    /// The host page's own handle on its scene.
    pub scene: Option<SceneHandle>,
    page: JoinHandle<PageContext>,
}

impl Session {
    /// Load the page, open the panel, and keep re-initializing the panel
    /// until it connects or detection has had its full polling window.
    pub async fn open(options: SessionOptions) -> Self {
        let window = Arc::new(PageWindow::new());
        let scene = options.scene.map(|project| {
            let handle: SceneHandle = Arc::new(Mutex::new(project));
            window.publish_scope(handle.clone());
            handle
        });

        let (page_port, relay_port) = page_bus();
        let poll_interval = options.detector.period();
        let window_len = detection_window(&options.detector);
        let page = tokio::spawn(PageContext::new(window, options.detector).run(page_port));
        let bridge = Arc::new(RelayBridge::start(relay_port, options.relay));
        let mut store = InspectorStore::new(TabTransport::new(bridge));

        let deadline = Instant::now()
            .checked_add(window_len)
            .unwrap_or_else(far_future);
        loop {
            store.initialize().await;
            let status = &store.state().connection_status;
            if *status != ConnectionStatus::NotDetected || Instant::now() >= deadline {
                break;
            }
            log::debug!("{status}, retrying");
            tokio::time::sleep(poll_interval).await;
        }

        Self { store, scene, page }
    }

    pub fn connected(&self) -> bool {
        self.store.state().connected
    }

    /// Close the panel and the relay, and return the page context once its
    /// event loop has drained.
    pub async fn close(self) -> Result<PageContext> {
        let Session { store, page, .. } = self;
        drop(store);
        page.await.context("page context task failed")
    }
}

/// How long detection may take: every poll plus one interval of slack.
fn detection_window(config: &DetectorConfig) -> Duration {
    config
        .period()
        .checked_mul(config.max_tries.saturating_add(1))
        .unwrap_or(Duration::MAX)
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400 * 365)
}
