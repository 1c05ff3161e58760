//! The request-scoped render store.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use prerender_core::Location;
use prerender_effects::EffectHandle;
use serde_json::{json, Value};

use crate::action::Action;
use crate::history::MemoryHistory;
use crate::state::StateTree;

struct StoreInner {
    state: Mutex<StateTree>,
    history: Mutex<MemoryHistory>,
    effects: EffectHandle,
    sealed: AtomicBool,
    completed: AtomicBool,
}

/// The state container for one render request.
///
/// Cheaply cloneable; clones share the same underlying store so effects
/// can dispatch results back as they arrive. The orchestrator owns the
/// store's lifetime and seals it when the request finishes, after which
/// dispatches and effect spawns are ignored.
#[derive(Clone)]
pub struct RenderStore {
    inner: Arc<StoreInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RenderStore {
    /// Create a store for a request, synced to a fresh history at the
    /// given location. The location is mirrored into state under
    /// `route.location`.
    pub fn new(location: Location, effects: EffectHandle) -> Self {
        let mut state = StateTree::new();
        state.set("route.location", location_value(&location));

        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(state),
                history: Mutex::new(MemoryHistory::new(location)),
                effects,
                sealed: AtomicBool::new(false),
                completed: AtomicBool::new(false),
            }),
        }
    }

    /// Dispatch an action.
    ///
    /// On a sealed store this is a no-op apart from a warning; a late
    /// effect must never write into a finished request.
    pub fn dispatch(&self, action: Action) {
        if self.is_sealed() {
            tracing::warn!(action = action.label(), "dispatch after store sealed; ignored");
            return;
        }

        match action {
            Action::Set { path, value } => lock(&self.inner.state).set(&path, value),
            Action::Merge { path, value } => lock(&self.inner.state).merge(&path, value),
            Action::ChangeLocale(locale) => {
                lock(&self.inner.state).set("intl.locale", Value::String(locale));
            }
            Action::Navigate(location) => {
                lock(&self.inner.state).set("route.location", location_value(&location));
                lock(&self.inner.history).push(location);
            }
            Action::Complete => {
                if !self.inner.completed.swap(true, Ordering::SeqCst) {
                    self.inner.effects.stop();
                }
            }
        }
    }

    /// Get a clone of the state at a dotted path.
    pub fn select(&self, path: &str) -> Option<Value> {
        lock(&self.inner.state).get(path)
    }

    /// Take a deep, serializable copy of the full state tree.
    pub fn snapshot(&self) -> Value {
        lock(&self.inner.state).snapshot()
    }

    /// Enqueue a background effect through the store's scheduler.
    ///
    /// Returns `false` if the store is sealed or the scheduler has
    /// already drained.
    pub fn spawn_effect<F>(&self, name: impl Into<String>, effect: F) -> bool
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = name.into();
        if self.is_sealed() {
            tracing::warn!(effect = %name, "effect spawned on sealed store; dropped");
            return false;
        }
        self.inner.effects.spawn(name, effect)
    }

    /// A clone of the scheduler handle, for effects that spawn more work.
    pub fn effect_handle(&self) -> EffectHandle {
        self.inner.effects.clone()
    }

    /// The current location according to the request's history.
    pub fn current_location(&self) -> Location {
        lock(&self.inner.history).current().clone()
    }

    /// Whether any navigation happened after store creation.
    pub fn navigated(&self) -> bool {
        !lock(&self.inner.history).is_initial()
    }

    /// Whether the completion signal has been dispatched.
    pub fn is_completed(&self) -> bool {
        self.inner.completed.load(Ordering::SeqCst)
    }

    /// Seal the store: all further dispatches and spawns are ignored.
    pub fn seal(&self) {
        self.inner.sealed.store(true, Ordering::SeqCst);
    }

    /// Whether the store has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.inner.sealed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for RenderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderStore")
            .field("sealed", &self.is_sealed())
            .field("completed", &self.is_completed())
            .finish()
    }
}

fn location_value(location: &Location) -> Value {
    json!({
        "pathname": location.pathname,
        "search": location.search,
    })
}

#[cfg(test)]
mod tests {
    use prerender_effects::scheduler_pair;
    use serde_json::json;

    use super::*;

    fn store_at(url: &str) -> RenderStore {
        let (handle, _monitor) = scheduler_pair();
        RenderStore::new(Location::parse(url), handle)
    }

    #[test]
    fn test_new_store_mirrors_location_into_state() {
        let store = store_at("/about?x=1");
        assert_eq!(
            store.select("route.location"),
            Some(json!({ "pathname": "/about", "search": "?x=1" }))
        );
    }

    #[test]
    fn test_dispatch_set_and_merge() {
        let store = store_at("/");
        store.dispatch(Action::Set {
            path: "page.title".to_string(),
            value: json!("Home"),
        });
        store.dispatch(Action::Merge {
            path: "page".to_string(),
            value: json!({ "ready": true }),
        });

        assert_eq!(
            store.select("page"),
            Some(json!({ "title": "Home", "ready": true }))
        );
    }

    #[test]
    fn test_change_locale() {
        let store = store_at("/");
        store.dispatch(Action::ChangeLocale("es".to_string()));
        assert_eq!(store.select("intl.locale"), Some(json!("es")));
    }

    #[test]
    fn test_navigate_updates_history_and_state() {
        let store = store_at("/");
        assert!(!store.navigated());

        store.dispatch(Action::Navigate(Location::parse("/next?q=1")));
        assert!(store.navigated());
        assert_eq!(store.current_location().full(), "/next?q=1");
        assert_eq!(
            store.select("route.location"),
            Some(json!({ "pathname": "/next", "search": "?q=1" }))
        );
    }

    #[test]
    fn test_complete_stops_the_scheduler_once() {
        let (handle, _monitor) = scheduler_pair();
        let store = RenderStore::new(Location::parse("/"), handle.clone());

        assert!(!store.is_completed());
        store.dispatch(Action::Complete);
        store.dispatch(Action::Complete);

        assert!(store.is_completed());
        assert!(handle.is_stopped());
    }

    #[test]
    fn test_sealed_store_ignores_dispatch() {
        let store = store_at("/");
        store.dispatch(Action::Set {
            path: "n".to_string(),
            value: json!(1),
        });
        store.seal();
        store.dispatch(Action::Set {
            path: "n".to_string(),
            value: json!(2),
        });

        assert_eq!(store.select("n"), Some(json!(1)));
    }

    #[test]
    fn test_sealed_store_rejects_effects() {
        let store = store_at("/");
        store.seal();
        assert!(!store.spawn_effect("late", async { Ok(()) }));
    }

    #[test]
    fn test_snapshot_is_detached_from_later_dispatch() {
        let store = store_at("/");
        store.dispatch(Action::Set {
            path: "n".to_string(),
            value: json!(1),
        });
        let snapshot = store.snapshot();
        store.dispatch(Action::Set {
            path: "n".to_string(),
            value: json!(2),
        });

        assert_eq!(snapshot.get("n"), Some(&json!(1)));
    }
}
