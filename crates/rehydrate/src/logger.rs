//! Passive diagnostics for the rehydration lifecycle.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use serde::Serialize;

/// Maximum events to keep in history.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Lifecycle events worth recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RehydrationEvent {
    SlicesAdded { slices: Vec<String> },
    StateTransferred { keys: Vec<String> },
    TransferSkipped { reason: String },
    RequestDeduplicated { key: String },
}

/// Records rehydration events to `tracing` and keeps a bounded history.
///
/// Holds no rehydration logic of its own. Clones share the history.
#[derive(Debug, Clone)]
pub struct RehydrationLogger {
    history: Arc<RwLock<VecDeque<RehydrationEvent>>>,
    max_size: usize,
}

impl RehydrationLogger {
    pub fn new() -> Self {
        Self::with_history_size(DEFAULT_HISTORY_SIZE)
    }

    pub fn with_history_size(max_size: usize) -> Self {
        Self {
            history: Arc::new(RwLock::new(VecDeque::new())),
            max_size,
        }
    }

    pub fn record(&self, event: RehydrationEvent) {
        match &event {
            RehydrationEvent::SlicesAdded { slices } => {
                tracing::debug!(?slices, "Rehydration slices added");
            }
            RehydrationEvent::StateTransferred { keys } => {
                tracing::debug!(?keys, "State written to transfer record");
            }
            RehydrationEvent::TransferSkipped { reason } => {
                tracing::debug!(%reason, "State transfer skipped");
            }
            RehydrationEvent::RequestDeduplicated { key } => {
                tracing::debug!(%key, "Hydrated request emission suppressed");
            }
        }

        let mut history = self.history.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Rehydration event history lock poisoned, recovering");
            poisoned.into_inner()
        });
        history.push_back(event);

        // Trim old events if history is too large
        while history.len() > self.max_size {
            history.pop_front();
        }
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> Vec<RehydrationEvent> {
        let history = self.history.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Rehydration event history lock poisoned, recovering");
            poisoned.into_inner()
        });
        history.iter().cloned().collect()
    }
}

impl Default for RehydrationLogger {
    fn default() -> Self {
        Self::new()
    }
}
