//! Stream operator that prevents duplicate requests during hydration.
//!
//! The operator uses the transfer record to remember which requests the
//! server already performed while rendering:
//!
//! - **Server**: every value passes through and marks the key.
//! - **Browser, first load**: the first value under a marked key is dropped
//!   and the marker is consumed.
//! - **Browser, afterwards**: values pass through normally.
//!
//! Errors and completion are always forwarded. The wrapped request still
//! runs on the browser; only its value is hidden from the consumer.
//!
//! # Example
//!
//! ```ignore
//! use rehydrate::{with_transfer_state, TransferStateExt};
//!
//! let users = api.fetch_users() // impl Stream<Item = Result<Vec<User>, ApiError>>
//!     .skip_hydrated(with_transfer_state("api-users", platform, &transfer));
//! ```

use futures_core::Stream;
use rehydrate_core::{request_marker_key, DedupOutcome, Platform, StateKey};
use tokio_stream::StreamExt;

use crate::logger::{RehydrationEvent, RehydrationLogger};
use crate::transport::TransferHandle;

/// A configured de-duplication transform for one request key.
///
/// Cheap to clone; each [`apply`](Self::apply) wraps one source stream.
#[derive(Debug, Clone)]
pub struct TransferStateOperator {
    key: StateKey<bool>,
    platform: Platform,
    transfer: TransferHandle,
    logger: Option<RehydrationLogger>,
}

/// Build the de-duplication transform for `key`.
///
/// `key` must identify one logical request; uniqueness is the caller's
/// responsibility.
pub fn with_transfer_state(
    key: impl Into<String>,
    platform: Platform,
    transfer: &TransferHandle,
) -> TransferStateOperator {
    let key: String = key.into();
    TransferStateOperator {
        key: request_marker_key(&key),
        platform,
        transfer: transfer.clone(),
        logger: None,
    }
}

impl TransferStateOperator {
    /// Record suppressed emissions through `logger`.
    pub fn with_logger(mut self, logger: RehydrationLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Wrap `source`, filtering its values through the transfer record.
    ///
    /// The decision runs once per value, when the value arrives. A source
    /// that never produces a value never touches the transfer record.
    pub fn apply<S, T, E>(&self, source: S) -> impl Stream<Item = Result<T, E>>
    where
        S: Stream<Item = Result<T, E>>,
    {
        let key = self.key.clone();
        let platform = self.platform;
        let transfer = self.transfer.clone();
        let logger = self.logger.clone();

        async_stream::stream! {
            let mut source = std::pin::pin!(source);

            while let Some(item) = source.next().await {
                match item {
                    Ok(value) => {
                        match transfer.filter_emission(&key, platform).await {
                            DedupOutcome::Suppressed => {
                                tracing::debug!(key = key.as_str(), "Skipping value already fetched during SSR");
                                if let Some(logger) = &logger {
                                    logger.record(RehydrationEvent::RequestDeduplicated {
                                        key: key.as_str().to_string(),
                                    });
                                }
                            }
                            DedupOutcome::Marked => {
                                tracing::trace!(key = key.as_str(), "Request marked for hydration");
                                yield Ok(value);
                            }
                            DedupOutcome::PassedThrough => yield Ok(value),
                        }
                    }
                    Err(e) => yield Err(e),
                }
            }
        }
    }
}

/// Extension trait applying a [`TransferStateOperator`] to fallible streams.
pub trait TransferStateExt<T, E>: Stream<Item = Result<T, E>> + Sized {
    /// Drop the value the server already fetched for this request.
    fn skip_hydrated(self, operator: TransferStateOperator) -> impl Stream<Item = Result<T, E>>;
}

impl<S, T, E> TransferStateExt<T, E> for S
where
    S: Stream<Item = Result<T, E>>,
{
    fn skip_hydrated(self, operator: TransferStateOperator) -> impl Stream<Item = Result<T, E>> {
        operator.apply(self)
    }
}
