//! Environment-driven rehydration overrides.

use std::env;

use rehydrate_core::PartialRehydrationConfig;

/// Comma-separated slice names to transfer.
pub const STORES_ENV: &str = "REHYDRATE_STORES";
/// Merge strategy name (`OVERWRITE`, `MERGE`, or a custom name).
pub const MERGE_STRATEGY_ENV: &str = "REHYDRATE_MERGE_STRATEGY";

/// Load rehydration overrides from environment variables.
///
/// Environment variables:
/// - `REHYDRATE_STORES` - Slices to transfer (default: none)
/// - `REHYDRATE_MERGE_STRATEGY` - Merge strategy (default: `OVERWRITE`)
///
/// Unset or blank variables leave the field to the defaults.
pub fn config_from_env() -> PartialRehydrationConfig {
    PartialRehydrationConfig::from_vars(
        env::var(STORES_ENV).ok().as_deref(),
        env::var(MERGE_STRATEGY_ENV).ok().as_deref(),
    )
}
