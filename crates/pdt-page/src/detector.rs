//! Polling discovery of a published scene.
//!
//! ```text
//! Idle ──start──▶ Polling ──hit──▶ Detected
//!                    │
//!                    └──max_tries misses──▶ Exhausted
//! ```
//!
//! The detector itself never sleeps: its owner calls [`Detector::poll`] once
//! per [`DetectorConfig::poll_interval`].

use crate::registry::ScopeRegistry;
use crate::window::PageWindow;
use pdt_core::CanvasElement;
use std::sync::PoisonError;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    Polling,
    Detected,
    Exhausted,
}

/// Shortest interval the detector is ever polled at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Polls before giving up.
    pub max_tries: u32,
    /// Clamped to [`MIN_POLL_INTERVAL`] when polled, see [`Self::period`].
    pub poll_interval: Duration,
}

impl DetectorConfig {
    /// The interval actually used between polls. Never zero.
    pub fn period(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_tries: 10,
            poll_interval: Duration::from_millis(1000),
        }
    }
}

/// A successful detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Registry id the scene was stored under.
    pub scope_id: String,
}

#[derive(Debug)]
pub struct Detector {
    config: DetectorConfig,
    state: DetectorState,
    tries: u32,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            state: DetectorState::Idle,
            tries: 0,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn is_polling(&self) -> bool {
        self.state == DetectorState::Polling
    }

    /// Begin polling. Returns `false` if a poll cycle is already running.
    pub fn start(&mut self) -> bool {
        if self.is_polling() {
            return false;
        }
        self.state = DetectorState::Polling;
        self.tries = 0;
        log::debug!("scene detection started");
        true
    }

    /// Re-arm from any state and start a fresh poll cycle.
    pub fn restart(&mut self) {
        self.state = DetectorState::Idle;
        self.start();
    }

    /// One poll of the page slot.
    ///
    /// On a hit the scene is registered and `Some` is returned once an
    /// active scope is confirmed; the detector then stops. After
    /// `max_tries` misses it stops without a signal.
    pub fn poll(&mut self, window: &PageWindow, registry: &mut ScopeRegistry) -> Option<Detection> {
        if !self.is_polling() {
            return None;
        }
        self.tries += 1;
        log::trace!("detection poll {}/{}", self.tries, self.config.max_tries);

        if let Some(handle) = window.published_scope() {
            let canvas = handle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .view
                .as_ref()
                .map(|view| view.element.clone());
            let scope_id = scope_id_for(canvas.as_ref(), registry);
            registry.register(scope_id.clone(), handle, canvas);

            if registry.active_scope().is_some() {
                self.state = DetectorState::Detected;
                log::debug!("scene detected as {scope_id} after {} polls", self.tries);
                return Some(Detection { scope_id });
            }
        }

        if self.tries >= self.config.max_tries {
            self.state = DetectorState::Exhausted;
            log::debug!("no scene found after {} polls", self.tries);
        }
        None
    }
}

/// Registry id for a scene drawing into `canvas`: the canvas DOM id, or
/// `scope-<n>` when the canvas has none.
fn scope_id_for(canvas: Option<&CanvasElement>, registry: &ScopeRegistry) -> String {
    match canvas.and_then(|c| c.id.as_deref()) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            let fallback = format!("scope-{}", registry.len());
            log::warn!("scene canvas has no id, registering as {fallback}");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdt_core::{Project, View};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn publish(window: &PageWindow, canvas: CanvasElement) {
        let project = Project::new(Some(View::new(canvas)));
        window.publish_scope(Arc::new(Mutex::new(project)));
    }

    #[test]
    fn period_is_never_zero() {
        let mut config = DetectorConfig::default();
        assert_eq!(config.period(), Duration::from_millis(1000));
        config.poll_interval = Duration::ZERO;
        assert_eq!(config.period(), MIN_POLL_INTERVAL);
    }

    #[test]
    fn polls_until_exhausted() {
        let window = PageWindow::new();
        let mut registry = ScopeRegistry::new();
        let mut detector = Detector::new(DetectorConfig {
            max_tries: 3,
            ..DetectorConfig::default()
        });
        assert!(detector.poll(&window, &mut registry).is_none());
        assert_eq!(detector.state(), DetectorState::Idle);

        assert!(detector.start());
        assert!(!detector.start());
        for _ in 0..3 {
            assert!(detector.poll(&window, &mut registry).is_none());
        }
        assert_eq!(detector.state(), DetectorState::Exhausted);
        assert_eq!(detector.tries(), 3);

        // A scene published after exhaustion is not picked up.
        publish(&window, CanvasElement::new("late", 10.0, 10.0));
        assert!(detector.poll(&window, &mut registry).is_none());
        assert!(registry.is_empty());

        detector.restart();
        assert_eq!(
            detector.poll(&window, &mut registry),
            Some(Detection {
                scope_id: "late".into()
            })
        );
    }

    #[test]
    fn detection_registers_by_canvas_id() {
        let window = PageWindow::new();
        let mut registry = ScopeRegistry::new();
        let mut detector = Detector::new(DetectorConfig::default());
        detector.start();

        assert!(detector.poll(&window, &mut registry).is_none());
        publish(&window, CanvasElement::new("paper-canvas", 800.0, 600.0));
        let detection = detector.poll(&window, &mut registry).unwrap();

        assert_eq!(detection.scope_id, "paper-canvas");
        assert_eq!(detector.state(), DetectorState::Detected);
        assert_eq!(detector.tries(), 2);
        assert_eq!(registry.active_scope_id(), Some("paper-canvas"));
        assert!(detector.poll(&window, &mut registry).is_none());
    }

    #[test]
    fn anonymous_canvas_gets_fallback_id() {
        let window = PageWindow::new();
        let mut registry = ScopeRegistry::new();
        let mut detector = Detector::new(DetectorConfig::default());

        publish(&window, CanvasElement::anonymous(100.0, 100.0));
        detector.start();
        let first = detector.poll(&window, &mut registry).unwrap();
        assert_eq!(first.scope_id, "scope-0");

        publish(&window, CanvasElement::new("", 100.0, 100.0));
        detector.restart();
        let second = detector.poll(&window, &mut registry).unwrap();
        assert_eq!(second.scope_id, "scope-1");
        assert_eq!(registry.active_scope_id(), Some("scope-0"));
    }
}
