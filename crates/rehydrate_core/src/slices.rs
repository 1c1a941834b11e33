//! Slice registry and state projection.
//!
//! Pure functions used by stores to track which slices travel from the
//! server to the browser, and to fold transferred slices back in.

use serde_json::{Map, Value};

use crate::config::MergeStrategy;

/// Append `slices` to `registry`, skipping names already registered.
///
/// Registration order is preserved.
pub fn add_slices(registry: &[String], slices: &[String]) -> Vec<String> {
    let mut merged = registry.to_vec();
    for slice in slices {
        if !merged.contains(slice) {
            merged.push(slice.clone());
        }
    }
    merged
}

/// Project the registered `slices` out of the global `state`.
///
/// Only top-level slices present in `state` are copied. A non-object state
/// projects to an empty object.
pub fn select_state_to_transfer(state: &Value, slices: &[String]) -> Value {
    let mut projection = Map::new();
    if let Value::Object(root) = state {
        for slice in slices {
            if let Some(value) = root.get(slice) {
                projection.insert(slice.clone(), value.clone());
            }
        }
    }
    Value::Object(projection)
}

/// Fold `transferred` slices into the client `state`.
///
/// - `Overwrite`: each transferred slice replaces the client slice.
/// - `Merge`: when both sides are objects, transferred fields are laid over
///   the client fields one level deep; otherwise the transferred slice wins.
/// - `Custom`: the client state is returned untouched.
pub fn merge_rehydrated(state: &Value, transferred: &Value, strategy: &MergeStrategy) -> Value {
    let Value::Object(incoming) = transferred else {
        return state.clone();
    };

    let mut root = match state {
        Value::Object(root) => root.clone(),
        _ => Map::new(),
    };

    match strategy {
        MergeStrategy::Overwrite => {
            for (slice, value) in incoming {
                root.insert(slice.clone(), value.clone());
            }
        }
        MergeStrategy::Merge => {
            for (slice, value) in incoming {
                let merged = match (root.get(slice), value) {
                    (Some(Value::Object(current)), Value::Object(fields)) => {
                        let mut current = current.clone();
                        for (field, field_value) in fields {
                            current.insert(field.clone(), field_value.clone());
                        }
                        Value::Object(current)
                    }
                    _ => value.clone(),
                };
                root.insert(slice.clone(), merged);
            }
        }
        MergeStrategy::Custom(_) => return state.clone(),
    }

    Value::Object(root)
}
