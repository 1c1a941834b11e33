//! Server-side state transfer.

use async_trait::async_trait;
use rehydrate_core::{add_slices, check_payload_size, transfer_state_key, RehydrateAction};
use tokio_stream::StreamExt;

use crate::app::{AppContext, BootstrapListener, Providers};
use crate::error::{RehydrateError, Result};
use crate::logger::RehydrationEvent;
use crate::store::Store;
use crate::transport::TransferHandle;

/// Provides store state transfer for server-side rendering.
///
/// Registers a bootstrap listener that snapshots the store's
/// state-to-transfer projection into the transfer record once bootstrap
/// completes. Slices named by the root configuration and by feature
/// registrations are registered with the store first, so they are part of
/// the projection.
///
/// # Example
///
/// ```
/// use rehydrate::{provide_rehydrate_browser, provide_rehydrate_server, PartialRehydrationConfig};
///
/// let providers = provide_rehydrate_browser(PartialRehydrationConfig::default())
///     .extend(provide_rehydrate_server());
/// assert_eq!(providers.bootstrap_listener_count(), 1);
/// ```
pub fn provide_rehydrate_server() -> Providers {
    Providers::new().with_bootstrap_listener(ServerTransferListener)
}

/// Bootstrap listener writing the store projection into the transfer record.
///
/// Does nothing on the browser. Failures are logged and the transfer is
/// skipped; bootstrap continues.
pub struct ServerTransferListener;

#[async_trait]
impl BootstrapListener for ServerTransferListener {
    async fn on_bootstrap(&self, ctx: &AppContext) {
        if !ctx.platform.is_server() {
            return;
        }

        let slices = add_slices(&ctx.config().stores, ctx.transfer_slices());
        if !slices.is_empty() {
            ctx.store.dispatch(RehydrateAction::AddSlice { slices });
        }

        match transfer_state(ctx.store.as_ref(), &ctx.transfer).await {
            Ok(Some(keys)) => {
                tracing::debug!(?keys, "Store state transferred");
                ctx.logger.record(RehydrationEvent::StateTransferred { keys });
            }
            Ok(None) => {
                ctx.logger.record(RehydrationEvent::TransferSkipped {
                    reason: "selection emitted null".to_string(),
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "Error transferring state");
                ctx.logger.record(RehydrationEvent::TransferSkipped {
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Take the first state-to-transfer projection from `store` and write it
/// under the reserved transfer key.
///
/// Returns the slice names written, or `None` when the projection was
/// `null`. Waits until the selection emits; there is no timeout.
pub async fn transfer_state(
    store: &dyn Store,
    transfer: &TransferHandle,
) -> Result<Option<Vec<String>>> {
    let state = {
        let mut selection = store.select_state_to_transfer();
        selection.next().await.ok_or(RehydrateError::NoStateEmitted)??
    };

    if state.is_null() {
        return Ok(None);
    }

    check_payload_size(&state)?;
    transfer.set(&transfer_state_key(), &state).await?;

    let keys = state
        .as_object()
        .map(|slices| slices.keys().cloned().collect())
        .unwrap_or_default();

    Ok(Some(keys))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::App;
    use crate::browser::{provide_rehydrate_browser, provide_rehydrate_feature};
    use crate::store::testing::{FailingStore, RecordingStore};
    use crate::store::MemoryStore;
    use rehydrate_core::{MergeStrategy, PartialRehydrationConfig, Platform};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_transfer_state_writes_first_projection() {
        let store = RecordingStore::with_selection(json!({"auth": {"token": "t"}}));
        let transfer = TransferHandle::default();

        let keys = transfer_state(&store, &transfer).await.unwrap();

        assert_eq!(keys, Some(vec!["auth".to_string()]));
        assert_eq!(
            transfer.get(&transfer_state_key()).await,
            Some(json!({"auth": {"token": "t"}}))
        );
    }

    #[tokio::test]
    async fn test_transfer_state_selection_error() {
        let transfer = TransferHandle::default();

        let result = transfer_state(&FailingStore, &transfer).await;

        assert!(matches!(result, Err(RehydrateError::Store(_))));
        assert!(transfer.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_transfer_state_no_emission() {
        let store = RecordingStore::default();
        let transfer = TransferHandle::default();

        let result = transfer_state(&store, &transfer).await;

        assert!(matches!(result, Err(RehydrateError::NoStateEmitted)));
        assert!(transfer.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_transfer_state_null_skipped() {
        let store = RecordingStore::with_selection(Value::Null);
        let transfer = TransferHandle::default();

        let result = transfer_state(&store, &transfer).await.unwrap();

        assert_eq!(result, None);
        assert!(transfer.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_transfer_state_too_large_skipped() {
        let store = RecordingStore::with_selection(json!({"big": "x".repeat(6 * 1024 * 1024)}));
        let transfer = TransferHandle::default();

        let result = transfer_state(&store, &transfer).await;

        assert!(matches!(result, Err(RehydrateError::Core(_))));
        assert!(transfer.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_listener_swallows_selection_error() {
        let app = App::new(provide_rehydrate_server());
        let transfer = TransferHandle::default();

        let ctx = app
            .bootstrap(Platform::Server, Arc::new(FailingStore), transfer.clone())
            .await;

        assert!(transfer.snapshot().await.is_empty());
        assert_eq!(ctx.platform, Platform::Server);
        assert!(matches!(
            app.logger().events().as_slice(),
            [RehydrationEvent::TransferSkipped { .. }]
        ));
    }

    #[tokio::test]
    async fn test_listener_noop_on_browser() {
        let store = Arc::new(RecordingStore::with_selection(json!({"auth": {}})));
        let transfer = TransferHandle::default();

        App::new(provide_rehydrate_server())
            .bootstrap(Platform::Browser, store.clone(), transfer.clone())
            .await;

        assert!(store.actions().is_empty());
        assert!(transfer.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_listener_registers_root_slices() {
        let store = Arc::new(RecordingStore::with_selection(json!({})));

        App::new(
            provide_rehydrate_browser(PartialRehydrationConfig::default().with_stores(["auth"]))
                .extend(provide_rehydrate_server()),
        )
        .bootstrap(Platform::Server, store.clone(), TransferHandle::default())
        .await;

        // The browser initializer stays idle on the server.
        assert_eq!(store.actions(), vec![RehydrateAction::add_slice(["auth"])]);
    }

    #[tokio::test]
    async fn test_server_render_with_memory_store() {
        let store = Arc::new(MemoryStore::new(json!({
            "auth": {"token": "t"},
            "ui": {"open": true}
        })));

        let app = App::new(
            provide_rehydrate_browser(PartialRehydrationConfig::default().with_stores(["auth"]))
                .extend(provide_rehydrate_server()),
        );
        let ctx = app
            .bootstrap(Platform::Server, store, TransferHandle::default())
            .await;

        assert_eq!(
            ctx.transfer.get(&transfer_state_key()).await,
            Some(json!({"auth": {"token": "t"}}))
        );
        assert_eq!(
            app.logger().events(),
            vec![RehydrationEvent::StateTransferred {
                keys: vec!["auth".to_string()]
            }]
        );
    }

    #[tokio::test]
    async fn test_listener_registers_feature_slices() {
        let store = Arc::new(RecordingStore::with_selection(json!({})));

        App::new(
            provide_rehydrate_browser(PartialRehydrationConfig::default().with_stores(["auth"]))
                .extend(provide_rehydrate_feature(["admin", "auth"]))
                .extend(provide_rehydrate_server()),
        )
        .bootstrap(Platform::Server, store.clone(), TransferHandle::default())
        .await;

        assert_eq!(
            store.actions(),
            vec![RehydrateAction::add_slice(["auth", "admin"])]
        );
    }

    #[tokio::test]
    async fn test_feature_slices_survive_page_round_trip() {
        let app = App::new(
            provide_rehydrate_browser(
                PartialRehydrationConfig::default()
                    .with_stores(["auth"])
                    .with_merge_strategy(MergeStrategy::Overwrite),
            )
            .extend(provide_rehydrate_feature(["admin"]))
            .extend(provide_rehydrate_server()),
        );

        let server_store = Arc::new(MemoryStore::new(json!({
            "auth": {"t": 1},
            "admin": {"users": ["ada"]},
            "ui": {"open": true}
        })));
        let ctx = app
            .bootstrap(Platform::Server, server_store, TransferHandle::default())
            .await;
        let page = format!("<body>{}</body>", app.render_payload(&ctx).await.unwrap());

        let browser_store = Arc::new(MemoryStore::new(json!({
            "auth": null,
            "admin": null,
            "ui": {"open": false}
        })));
        app.bootstrap(
            Platform::Browser,
            browser_store.clone(),
            app.transfer_from_page(&page),
        )
        .await;

        assert_eq!(
            browser_store.state(),
            json!({
                "auth": {"t": 1},
                "admin": {"users": ["ada"]},
                "ui": {"open": false}
            })
        );
        assert_eq!(browser_store.slices(), vec!["auth", "admin"]);
    }
}
