use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::MergeStrategy;

/// Actions the rehydration hooks dispatch to the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum RehydrateAction {
    /// Register slices whose state is carried from the server.
    #[serde(rename = "[Rehydrate] Add Slice")]
    AddSlice { slices: Vec<String> },
    /// Fold transferred state into the client store.
    #[serde(rename = "[Rehydrate] Rehydrate")]
    Rehydrate {
        state: Value,
        merge_strategy: MergeStrategy,
    },
}

impl RehydrateAction {
    pub fn add_slice<I, S>(slices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RehydrateAction::AddSlice {
            slices: slices.into_iter().map(Into::into).collect(),
        }
    }
}
