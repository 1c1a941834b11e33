use serde_json::Value;

use crate::transfer::StateKey;

/// Reserved transport key holding the transferred store slices.
pub const REHYDRATE_TRANSFER_STATE: &str = "REHYDRATE_STATE";

/// Application id used when the host does not configure one.
pub const DEFAULT_APP_ID: &str = "app";

/// Returns the typed key for the transferred store slices.
pub fn transfer_state_key() -> StateKey<Value> {
    StateKey::new(REHYDRATE_TRANSFER_STATE)
}

/// Returns the typed key for a de-duplicated request marker.
pub fn request_marker_key(key: &str) -> StateKey<bool> {
    StateKey::new(key)
}

/// Returns the DOM id of the script element carrying the transfer payload.
pub fn transfer_script_id(app_id: &str) -> String {
    format!("{}-state", app_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_state_key() {
        assert_eq!(transfer_state_key().as_str(), "REHYDRATE_STATE");
    }

    #[test]
    fn test_request_marker_key() {
        assert_eq!(request_marker_key("api-users").as_str(), "api-users");
    }

    #[test]
    fn test_transfer_script_id() {
        assert_eq!(transfer_script_id(DEFAULT_APP_ID), "app-state");
        assert_eq!(transfer_script_id("shop"), "shop-state");
    }
}
