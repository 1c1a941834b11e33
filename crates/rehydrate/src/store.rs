//! Store seam used by the rehydration hooks, with an in-memory implementation.
//!
//! The hooks only need two things from a state store: a way to dispatch
//! [`RehydrateAction`]s and a stream of the state that should travel to the
//! browser. Any store can plug in by implementing [`Store`].

use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use rehydrate_core::{add_slices, merge_rehydrated, MergeStrategy, RehydrateAction};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tokio_stream::{wrappers::WatchStream, StreamExt};

use crate::error::StoreError;

/// Stream of state-to-transfer projections.
pub type StateStream = Pin<Box<dyn Stream<Item = Result<Value, StoreError>> + Send>>;

/// Trait for the state store the hooks are wired into.
pub trait Store: Send + Sync {
    /// Dispatches an action. Fire-and-forget: nothing is acknowledged.
    fn dispatch(&self, action: RehydrateAction);

    /// Selects the projection of the state that should be transferred.
    ///
    /// The stream emits the current projection first, then every change.
    fn select_state_to_transfer(&self) -> StateStream;
}

/// State held by a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    /// Global application state, one top-level field per slice.
    pub state: Value,
    /// Slices registered for transfer.
    pub slices: Vec<String>,
}

/// In-memory store backed by a `tokio::sync::watch` channel.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<watch::Sender<StoreSnapshot>>,
}

impl MemoryStore {
    /// Creates a store with the given initial application state.
    pub fn new(initial_state: Value) -> Self {
        let (sender, _) = watch::channel(StoreSnapshot {
            state: initial_state,
            slices: Vec::new(),
        });
        Self {
            inner: Arc::new(sender),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.borrow().clone()
    }

    pub fn state(&self) -> Value {
        self.inner.borrow().state.clone()
    }

    pub fn slices(&self) -> Vec<String> {
        self.inner.borrow().slices.clone()
    }

    /// Replaces one top-level slice of the application state.
    pub fn set_slice(&self, slice: &str, value: Value) {
        self.inner.send_modify(|snapshot| {
            if !snapshot.state.is_object() {
                snapshot.state = Value::Object(Map::new());
            }
            if let Value::Object(root) = &mut snapshot.state {
                root.insert(slice.to_string(), value);
            }
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl Store for MemoryStore {
    fn dispatch(&self, action: RehydrateAction) {
        match action {
            RehydrateAction::AddSlice { slices } => {
                self.inner.send_modify(|snapshot| {
                    snapshot.slices = add_slices(&snapshot.slices, &slices);
                });
            }
            RehydrateAction::Rehydrate {
                state,
                merge_strategy,
            } => {
                if let MergeStrategy::Custom(name) = &merge_strategy {
                    tracing::warn!(
                        strategy = %name,
                        "Custom merge strategy not supported by MemoryStore, state left unchanged"
                    );
                }
                self.inner.send_modify(|snapshot| {
                    snapshot.state = merge_rehydrated(&snapshot.state, &state, &merge_strategy);
                });
            }
        }
    }

    fn select_state_to_transfer(&self) -> StateStream {
        let stream = WatchStream::new(self.inner.subscribe()).map(|snapshot| {
            Ok::<_, StoreError>(rehydrate_core::select_state_to_transfer(
                &snapshot.state,
                &snapshot.slices,
            ))
        });
        Box::pin(stream)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_slice_registers_once() {
        let store = MemoryStore::default();

        store.dispatch(RehydrateAction::add_slice(["auth", "user"]));
        store.dispatch(RehydrateAction::add_slice(["user", "settings"]));

        assert_eq!(store.slices(), vec!["auth", "user", "settings"]);
    }

    #[test]
    fn test_set_slice() {
        let store = MemoryStore::new(json!({"ui": 1}));
        store.set_slice("auth", json!({"token": "t"}));
        assert_eq!(store.state(), json!({"ui": 1, "auth": {"token": "t"}}));
    }

    #[test]
    fn test_rehydrate_overwrite() {
        let store = MemoryStore::new(json!({"user": {"name": "anon", "theme": "dark"}}));

        store.dispatch(RehydrateAction::Rehydrate {
            state: json!({"user": {"name": "ada"}}),
            merge_strategy: MergeStrategy::Overwrite,
        });

        assert_eq!(store.state(), json!({"user": {"name": "ada"}}));
    }

    #[test]
    fn test_rehydrate_custom_leaves_state() {
        let store = MemoryStore::new(json!({"user": 1}));

        store.dispatch(RehydrateAction::Rehydrate {
            state: json!({"user": 2}),
            merge_strategy: MergeStrategy::Custom("keep-client".to_string()),
        });

        assert_eq!(store.state(), json!({"user": 1}));
    }

    #[tokio::test]
    async fn test_selection_emits_current_projection() {
        let store = MemoryStore::new(json!({"auth": {"token": "t"}, "ui": 1}));
        store.dispatch(RehydrateAction::add_slice(["auth"]));

        let mut selection = store.select_state_to_transfer();
        let first = selection.next().await.unwrap().unwrap();

        assert_eq!(first, json!({"auth": {"token": "t"}}));
    }

    #[tokio::test]
    async fn test_selection_emits_changes() {
        let store = MemoryStore::default();
        store.dispatch(RehydrateAction::add_slice(["auth"]));

        let mut selection = store.select_state_to_transfer();
        assert_eq!(selection.next().await.unwrap().unwrap(), json!({}));

        store.set_slice("auth", json!({"token": "t"}));
        assert_eq!(
            selection.next().await.unwrap().unwrap(),
            json!({"auth": {"token": "t"}})
        );
    }
}
