//! The page context's event loop.
//!
//! A single task owns all page-side state, so commands are handled strictly
//! one after another. Until the scene-tree script has been
//! injected there is no router and commands are dropped unanswered.

use crate::bus::{PageEvent, PageNotice, PagePort, PageScript};
use crate::detector::{Detector, DetectorConfig};
use crate::registry::ScopeRegistry;
use crate::router;
use crate::window::PageWindow;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

#[derive(Debug)]
pub struct PageContext {
    window: Arc<PageWindow>,
    registry: ScopeRegistry,
    detector: Detector,
    router_installed: bool,
}

impl PageContext {
    pub fn new(window: Arc<PageWindow>, config: DetectorConfig) -> Self {
        Self {
            window,
            registry: ScopeRegistry::new(),
            detector: Detector::new(config),
            router_installed: false,
        }
    }

    pub fn registry(&self) -> &ScopeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ScopeRegistry {
        &mut self.registry
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn router_installed(&self) -> bool {
        self.router_installed
    }

    /// Run until the relay side of the bus is dropped, then hand the
    /// context back.
    pub async fn run(mut self, mut port: PagePort) -> Self {
        let period = self.detector.config().period();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = port.events.recv() => {
                    let Some(event) = event else { break };
                    let was_polling = self.detector.is_polling();
                    self.handle_event(event, &port.notices);
                    if !was_polling && self.detector.is_polling() {
                        ticker.reset();
                    }
                }
                _ = ticker.tick(), if self.detector.is_polling() => {
                    if self.tick() {
                        send(&port.notices, PageNotice::Detected);
                    }
                }
            }
        }
        log::debug!("page bus closed");
        self
    }

    /// One detector poll. Returns `true` on detection.
    pub fn tick(&mut self) -> bool {
        self.detector
            .poll(&self.window, &mut self.registry)
            .is_some()
    }

    pub fn handle_event(&mut self, event: PageEvent, notices: &UnboundedSender<PageNotice>) {
        match event {
            PageEvent::Inject(script) => self.inject(script),
            PageEvent::Command(envelope) => {
                if !self.router_installed {
                    log::warn!(
                        "dropping {} [{}]: router not installed",
                        envelope.command.action(),
                        envelope.id
                    );
                    return;
                }
                if let Some(reply) = router::handle(envelope, &self.registry) {
                    send(notices, PageNotice::Response(reply));
                }
            }
        }
    }

    pub fn inject(&mut self, script: PageScript) {
        log::debug!("inject {script:?}");
        match script {
            PageScript::Detection => {
                if !self.detector.is_polling() {
                    self.detector.restart();
                }
            }
            PageScript::SceneTree => self.router_installed = true,
        }
    }
}

fn send(notices: &UnboundedSender<PageNotice>, notice: PageNotice) {
    if notices.send(notice).is_err() {
        log::debug!("relay went away, notice dropped");
    }
}
