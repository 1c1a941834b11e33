//! Rehydration configuration and its resolution from caller overrides.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the store should combine transferred slices with its own initial state.
///
/// The rehydration hooks only carry this value to the store; interpreting it
/// is the store's job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeStrategy {
    /// Transferred slices replace the client's slices.
    #[default]
    Overwrite,
    /// Transferred slice fields are laid over the client's slice fields.
    Merge,
    /// A caller-defined strategy identified by name.
    Custom(String),
}

impl MergeStrategy {
    /// Parses `overwrite` and `merge` (case-insensitive); any other name
    /// becomes [`MergeStrategy::Custom`].
    pub fn from_name(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "overwrite" => MergeStrategy::Overwrite,
            "merge" => MergeStrategy::Merge,
            _ => MergeStrategy::Custom(trimmed.to_string()),
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Overwrite => f.write_str("overwrite"),
            MergeStrategy::Merge => f.write_str("merge"),
            MergeStrategy::Custom(name) => f.write_str(name),
        }
    }
}

/// Effective rehydration configuration.
///
/// Resolved once at startup and shared read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RehydrationRootConfig {
    /// Store slices that are initialized from server state.
    pub stores: Vec<String>,
    /// Strategy passed through to the store when rehydrating.
    pub merge_strategy: MergeStrategy,
}

impl RehydrationRootConfig {
    /// Overlay `overrides` onto the default configuration.
    pub fn resolve(overrides: PartialRehydrationConfig) -> Self {
        Self::default().merge(overrides)
    }

    /// Shallow field-by-field override: each field present in `overrides`
    /// replaces the current value entirely.
    pub fn merge(self, overrides: PartialRehydrationConfig) -> Self {
        Self {
            stores: overrides.stores.unwrap_or(self.stores),
            merge_strategy: overrides.merge_strategy.unwrap_or(self.merge_strategy),
        }
    }
}

/// Caller-supplied overrides for [`RehydrationRootConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRehydrationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stores: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<MergeStrategy>,
}

impl PartialRehydrationConfig {
    pub fn with_stores<I, S>(mut self, stores: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stores = Some(stores.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = Some(strategy);
        self
    }

    /// Build overrides from raw variable values.
    ///
    /// `stores` is a comma-separated list. Unset or blank values leave the
    /// field unset.
    pub fn from_vars(stores: Option<&str>, merge_strategy: Option<&str>) -> Self {
        let stores = stores
            .filter(|s| !s.trim().is_empty())
            .map(parse_store_list);

        let merge_strategy = merge_strategy
            .filter(|s| !s.trim().is_empty())
            .map(MergeStrategy::from_name);

        Self {
            stores,
            merge_strategy,
        }
    }
}

/// Split a comma-separated list of slice names, dropping blanks.
pub fn parse_store_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
