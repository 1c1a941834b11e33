//! One simulated page load: a server render followed by a browser hydration.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use rehydrate::{with_transfer_state, App, MemoryStore, Platform, TransferHandle, TransferStateExt};
use serde_json::{json, Value};
use tokio_stream::{Stream, StreamExt};

/// Dedup key of the users request.
pub const USERS_REQUEST: &str = "api-users";

/// What the browser saw while hydrating the page.
#[derive(Debug)]
pub struct Hydration {
    /// Values delivered by the fetch issued during bootstrap.
    pub first_fetch: Vec<Value>,
    /// Values delivered by a later refresh of the same request.
    pub refresh: Vec<Value>,
    /// Store state once hydration finished.
    pub state: Value,
}

/// Stand-in for the HTTP client: a request yielding one list of users.
fn fetch_users() -> impl Stream<Item = Result<Value, String>> {
    tokio_stream::iter(vec![Ok::<_, String>(json!([
        {"id": 1, "name": "Ada"},
        {"id": 2, "name": "Grace"}
    ]))])
}

async fn collect<S>(stream: S) -> Result<Vec<Value>>
where
    S: Stream<Item = Result<Value, String>>,
{
    let stream = std::pin::pin!(stream);
    stream
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("request failed: {e}"))
}

/// Render the page on the server and return its HTML.
pub async fn server_render(app: &App) -> Result<String> {
    let store = Arc::new(MemoryStore::new(json!({
        "auth": {"user": "ada", "token": "t0k3n"},
        "users": [],
        "ui": {"sidebar": true}
    })));
    let transfer = TransferHandle::default();

    let users = collect(fetch_users().skip_hydrated(
        with_transfer_state(USERS_REQUEST, Platform::Server, &transfer)
            .with_logger(app.logger().clone()),
    ))
    .await?;
    store.set_slice("users", Value::Array(users));

    let ctx = app.bootstrap(Platform::Server, store, transfer).await;
    let script = app.render_payload(&ctx).await?;

    tracing::info!(app_id = app.app_id(), "Server render complete");

    Ok(format!(
        "<!DOCTYPE html><html><head><title>rehydrate</title></head><body><div id=\"root\"></div>{script}</body></html>"
    ))
}

/// Hydrate `page` in the browser and issue the users request twice.
pub async fn browser_hydrate(app: &App, page: &str) -> Result<Hydration> {
    let store = Arc::new(MemoryStore::new(json!({
        "auth": null,
        "users": [],
        "ui": {"sidebar": false}
    })));
    let transfer = app.transfer_from_page(page);

    app.bootstrap(Platform::Browser, store.clone(), transfer.clone())
        .await;

    let operator = with_transfer_state(USERS_REQUEST, Platform::Browser, &transfer)
        .with_logger(app.logger().clone());

    let first_fetch = collect(fetch_users().skip_hydrated(operator.clone())).await?;
    let refresh = collect(fetch_users().skip_hydrated(operator)).await?;

    Ok(Hydration {
        first_fetch,
        refresh,
        state: store.state(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehydrate::{
        provide_rehydrate_browser, provide_rehydrate_server, MergeStrategy,
        PartialRehydrationConfig, RehydrationEvent,
    };

    fn app(stores: &[&str]) -> App {
        App::new(
            provide_rehydrate_browser(
                PartialRehydrationConfig::default()
                    .with_stores(stores.iter().copied())
                    .with_merge_strategy(MergeStrategy::Overwrite),
            )
            .extend(provide_rehydrate_server()),
        )
    }

    #[tokio::test]
    async fn test_page_carries_configured_slices_and_marker() {
        let app = app(&["auth", "users"]);

        let page = server_render(&app).await.unwrap();

        assert!(page.contains(r#"<script id="app-state" type="application/json">"#));
        assert!(page.contains("\"api-users\":true"));
        assert!(page.contains("t0k3n"));
        // Slices not configured stay on the server.
        assert!(!page.contains("sidebar"));
    }

    #[tokio::test]
    async fn test_browser_skips_first_fetch_only() {
        let app = app(&["auth", "users"]);
        let page = server_render(&app).await.unwrap();

        let hydration = browser_hydrate(&app, &page).await.unwrap();

        assert!(hydration.first_fetch.is_empty());
        assert_eq!(hydration.refresh.len(), 1);
        assert_eq!(
            hydration.state,
            json!({
                "auth": {"user": "ada", "token": "t0k3n"},
                "users": [
                    {"id": 1, "name": "Ada"},
                    {"id": 2, "name": "Grace"}
                ],
                "ui": {"sidebar": false}
            })
        );
        assert!(app.logger().events().contains(&RehydrationEvent::RequestDeduplicated {
            key: USERS_REQUEST.to_string()
        }));
    }

    #[tokio::test]
    async fn test_browser_without_payload_fetches_normally() {
        let app = app(&["auth"]);

        let hydration = browser_hydrate(&app, "<html><body></body></html>")
            .await
            .unwrap();

        assert_eq!(hydration.first_fetch.len(), 1);
        assert_eq!(hydration.state["auth"], Value::Null);
    }
}
