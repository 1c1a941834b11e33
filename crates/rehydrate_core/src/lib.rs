//! Pure rehydration logic - no I/O, no async, no side effects.
//!
//! This crate provides:
//! - The transfer record carried from the server render to the browser
//! - Rehydration configuration with shallow override resolution
//! - The per-emission decision behind request de-duplication
//! - Slice registry, projection and merge functions for stores
//!
//! # Example
//!
//! ```
//! use rehydrate_core::{
//!     filter_emission, request_marker_key, Platform, PartialRehydrationConfig,
//!     RehydrationRootConfig, TransferState,
//! };
//!
//! // Resolve configuration from overrides
//! let config = RehydrationRootConfig::resolve(
//!     PartialRehydrationConfig::default().with_stores(["auth", "user"]),
//! );
//! assert_eq!(config.stores, vec!["auth", "user"]);
//!
//! // The server marks a request, the browser consumes the marker once
//! let key = request_marker_key("api-users");
//! let mut transfer = TransferState::new();
//! assert!(filter_emission(&key, Platform::Server, &mut transfer).emits());
//!
//! let page = transfer.to_script("app").unwrap();
//! let mut hydrated = TransferState::from_html(&page, "app").unwrap();
//! assert!(!filter_emission(&key, Platform::Browser, &mut hydrated).emits());
//! assert!(filter_emission(&key, Platform::Browser, &mut hydrated).emits());
//! ```

mod action;
mod config;
mod dedup;
mod error;
mod keys;
mod platform;
mod slices;
mod transfer;

pub use action::RehydrateAction;
pub use config::{parse_store_list, MergeStrategy, PartialRehydrationConfig, RehydrationRootConfig};
pub use dedup::{filter_emission, DedupOutcome};
pub use error::{RehydrateCoreError, Result, MAX_TRANSFER_PAYLOAD_SIZE};
pub use keys::{
    request_marker_key, transfer_script_id, transfer_state_key, DEFAULT_APP_ID,
    REHYDRATE_TRANSFER_STATE,
};
pub use platform::Platform;
pub use slices::{add_slices, merge_rehydrated, select_state_to_transfer};
pub use transfer::{check_payload_size, StateKey, TransferState};
