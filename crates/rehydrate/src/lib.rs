//! SSR State Rehydration - Imperative Shell.
//!
//! This crate wires a state store into the application lifecycle using pure
//! functions from `rehydrate_core`. It moves selected store slices from a
//! server render into the browser, and keeps the browser from repeating
//! requests the server already made while rendering.
//!
//! # Architecture
//!
//! - **Functional Core** (`rehydrate_core`): Transfer record, config, slice merging
//! - **Imperative Shell** (this crate): Lifecycle hooks, shared transport, streams
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rehydrate::{
//!     provide_rehydrate_browser, provide_rehydrate_server, App, MemoryStore,
//!     PartialRehydrationConfig, Platform, TransferHandle,
//! };
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> rehydrate::Result<()> {
//! let app = App::new(
//!     provide_rehydrate_browser(PartialRehydrationConfig::default().with_stores(["auth"]))
//!         .extend(provide_rehydrate_server()),
//! );
//!
//! // Server: bootstrap, then embed the transfer record into the page
//! let store = Arc::new(MemoryStore::new(json!({"auth": {"user": "ada"}})));
//! let ctx = app.bootstrap(Platform::Server, store, TransferHandle::default()).await;
//! let page = format!("<body>{}</body>", app.render_payload(&ctx).await?);
//!
//! // Browser: decode the page and bootstrap against the transferred state
//! let browser_store = Arc::new(MemoryStore::new(json!({"auth": null})));
//! let transfer = app.transfer_from_page(&page);
//! app.bootstrap(Platform::Browser, browser_store.clone(), transfer).await;
//!
//! assert_eq!(browser_store.state(), json!({"auth": {"user": "ada"}}));
//! # Ok(())
//! # }
//! ```

mod app;
mod browser;
mod config;
mod error;
mod logger;
mod operator;
mod server;
mod store;
mod transport;

// Re-export core types for convenience
pub use rehydrate_core::{
    request_marker_key, transfer_state_key, DedupOutcome, MergeStrategy,
    PartialRehydrationConfig, Platform, RehydrateAction, RehydrateCoreError,
    RehydrationRootConfig, StateKey, TransferState, DEFAULT_APP_ID,
    MAX_TRANSFER_PAYLOAD_SIZE, REHYDRATE_TRANSFER_STATE,
};

// Export shell types
pub use app::{App, AppContext, AppInitializer, BootstrapListener, Providers};
pub use browser::{provide_rehydrate_browser, provide_rehydrate_feature};
pub use config::{config_from_env, MERGE_STRATEGY_ENV, STORES_ENV};
pub use error::{RehydrateError, Result, StoreError};
pub use logger::{RehydrationEvent, RehydrationLogger, DEFAULT_HISTORY_SIZE};
pub use operator::{with_transfer_state, TransferStateExt, TransferStateOperator};
pub use server::{provide_rehydrate_server, transfer_state, ServerTransferListener};
pub use store::{MemoryStore, StateStream, Store, StoreSnapshot};
pub use transport::TransferHandle;
