//! The page's global slot for a scene instance.

use pdt_core::SceneHandle;
use std::sync::{Mutex, PoisonError};

/// Where a host page publishes its scene for the inspector to find.
///
/// Shared between the host page and the page context; holds at most one
/// scene at a time.
#[derive(Debug, Default)]
pub struct PageWindow {
    scope: Mutex<Option<SceneHandle>>,
}

impl PageWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `handle`, replacing any previously published scene.
    pub fn publish_scope(&self, handle: SceneHandle) {
        *self.scope.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    pub fn published_scope(&self) -> Option<SceneHandle> {
        self.scope
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
