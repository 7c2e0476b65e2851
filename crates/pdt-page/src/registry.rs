//! Registry of scene instances discovered in the page.
//!
//! Scopes are kept in registration order. The first scope ever registered
//! becomes the active one and later registrations never steal that role;
//! only [`ScopeRegistry::switch_scope`] moves it.

use pdt_core::{CanvasElement, SceneHandle};

/// A registered scene instance.
#[derive(Debug, Clone)]
pub struct ScopeRecord {
    pub id: String,
    pub handle: SceneHandle,
    /// Canvas the scene's view draws into, if it has a view.
    pub canvas: Option<CanvasElement>,
}

/// What [`ScopeRegistry::list_scopes`] reports for each scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSummary {
    pub id: String,
    pub canvas: Option<CanvasElement>,
    pub is_active: bool,
}

#[derive(Debug, Default)]
pub struct ScopeRegistry {
    scopes: Vec<ScopeRecord>,
    active: Option<String>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the scope stored under `id`.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        handle: SceneHandle,
        canvas: Option<CanvasElement>,
    ) {
        let id = id.into();
        let record = ScopeRecord {
            id: id.clone(),
            handle,
            canvas,
        };
        match self.scopes.iter_mut().find(|r| r.id == id) {
            Some(existing) => {
                log::debug!("scope {id} re-registered");
                *existing = record;
            }
            None => {
                log::debug!("scope {id} registered");
                self.scopes.push(record);
            }
        }
        if self.active.is_none() {
            self.active = Some(id);
        }
    }

    pub fn active_scope(&self) -> Option<SceneHandle> {
        let active = self.active.as_deref()?;
        self.get(active).map(|r| r.handle.clone())
    }

    pub fn active_scope_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&ScopeRecord> {
        self.scopes.iter().find(|r| r.id == id)
    }

    /// Make `id` the active scope. Unknown ids leave the registry untouched.
    pub fn switch_scope(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            log::warn!("cannot switch to unknown scope {id}");
            return false;
        }
        self.active = Some(id.to_string());
        true
    }

    pub fn list_scopes(&self) -> Vec<ScopeSummary> {
        self.scopes
            .iter()
            .map(|r| ScopeSummary {
                id: r.id.clone(),
                canvas: r.canvas.clone(),
                is_active: self.active.as_deref() == Some(r.id.as_str()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdt_core::Project;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn handle() -> SceneHandle {
        Arc::new(Mutex::new(Project::new(None)))
    }

    #[test]
    fn first_registration_stays_active() {
        let mut registry = ScopeRegistry::new();
        let a = handle();
        registry.register("a", a.clone(), None);
        registry.register("b", handle(), None);

        assert_eq!(registry.active_scope_id(), Some("a"));
        assert!(Arc::ptr_eq(&registry.active_scope().unwrap(), &a));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn reregistering_replaces_in_place() {
        let mut registry = ScopeRegistry::new();
        registry.register("a", handle(), None);
        registry.register("b", handle(), None);
        let replacement = handle();
        registry.register("b", replacement.clone(), Some(CanvasElement::new("b", 10.0, 10.0)));

        let ids: Vec<String> = registry.list_scopes().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
        assert!(Arc::ptr_eq(&registry.get("b").unwrap().handle, &replacement));
        assert_eq!(registry.active_scope_id(), Some("a"));
    }

    #[test]
    fn switching_scopes() {
        let mut registry = ScopeRegistry::new();
        assert!(registry.active_scope().is_none());
        assert!(!registry.switch_scope("missing"));

        let a = handle();
        let b = handle();
        registry.register("a", a.clone(), None);
        registry.register("b", b.clone(), None);
        assert!(Arc::ptr_eq(&registry.active_scope().unwrap(), &a));

        assert!(registry.switch_scope("b"));
        assert!(Arc::ptr_eq(&registry.active_scope().unwrap(), &b));
        assert!(!registry.switch_scope("c"));
        assert!(Arc::ptr_eq(&registry.active_scope().unwrap(), &b));
        assert_eq!(registry.active_scope_id(), Some("b"));

        let summaries = registry.list_scopes();
        assert_eq!(
            summaries
                .iter()
                .map(|s| (s.id.as_str(), s.is_active))
                .collect::<Vec<_>>(),
            vec![("a", false), ("b", true)]
        );
    }
}
