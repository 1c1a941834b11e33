//! Shared handle to the transfer record for one page lifecycle.

use std::sync::Arc;

use rehydrate_core::{filter_emission, DedupOutcome, Platform, StateKey, TransferState};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;

/// Cloneable handle to the [`TransferState`] of a single render or hydration.
///
/// Every clone points at the same record.
#[derive(Debug, Clone, Default)]
pub struct TransferHandle {
    inner: Arc<RwLock<TransferState>>,
}

impl TransferHandle {
    pub fn new(state: TransferState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Decode the transfer record embedded in a server-rendered page.
    ///
    /// A missing or malformed payload yields an empty record: the browser then
    /// behaves like a fresh, non-hydrated load.
    pub fn from_html(html: &str, app_id: &str) -> Self {
        match TransferState::from_html(html, app_id) {
            Ok(state) => {
                tracing::debug!(app_id, keys = state.len(), "Transfer payload decoded");
                Self::new(state)
            }
            Err(e) => {
                tracing::warn!(app_id, error = %e, "Transfer payload unavailable, starting empty");
                Self::default()
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &StateKey<T>) -> Option<T> {
        self.inner.read().await.get(key)
    }

    pub async fn set<T: Serialize>(&self, key: &StateKey<T>, value: &T) -> Result<()> {
        self.inner.write().await.set(key, value)?;
        Ok(())
    }

    pub async fn has_key<T>(&self, key: &StateKey<T>) -> bool {
        self.inner.read().await.has_key(key)
    }

    /// Removes `key`, returning whether it was present.
    pub async fn remove<T>(&self, key: &StateKey<T>) -> bool {
        self.inner.write().await.remove(key)
    }

    /// Run the de-duplication decision for one emission under `key`.
    ///
    /// The check and the removal happen under a single write lock.
    pub async fn filter_emission<T>(&self, key: &StateKey<T>, platform: Platform) -> DedupOutcome {
        let mut state = self.inner.write().await;
        filter_emission(key, platform, &mut state)
    }

    /// Copy of the current record.
    pub async fn snapshot(&self) -> TransferState {
        self.inner.read().await.clone()
    }

    /// Encode the current record as the page's transfer `<script>` element.
    pub async fn to_script(&self, app_id: &str) -> Result<String> {
        Ok(self.inner.read().await.to_script(app_id)?)
    }
}
