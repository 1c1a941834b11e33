//! Per-emission decision for the duplicate-request suppression operator.
//!
//! The server marks every key it sees; the browser consumes a marker once
//! and drops the emission that consumed it.

use crate::platform::Platform;
use crate::transfer::{StateKey, TransferState};

/// What happened to a single emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DedupOutcome {
    /// Server side: the key was marked and the value passes through.
    Marked,
    /// Browser side: a marker was found and consumed; the value is dropped.
    Suppressed,
    /// Browser side: no marker; the value passes through.
    PassedThrough,
}

impl DedupOutcome {
    /// Whether the value reaches the consumer.
    pub fn emits(self) -> bool {
        !matches!(self, DedupOutcome::Suppressed)
    }
}

/// Decide the fate of one emission under `key`, updating `transfer`.
///
/// On the server the marker is written on every call, overwriting any value
/// already stored under the key.
pub fn filter_emission<T>(
    key: &StateKey<T>,
    platform: Platform,
    transfer: &mut TransferState,
) -> DedupOutcome {
    if platform.is_server() {
        transfer.mark(key.as_str());
        return DedupOutcome::Marked;
    }

    if transfer.remove(key) {
        DedupOutcome::Suppressed
    } else {
        DedupOutcome::PassedThrough
    }
}
