//! Rehydration errors including store failures.

use rehydrate_core::RehydrateCoreError;
use thiserror::Error;

/// Errors raised by a [`Store`](crate::Store) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("State selection failed: {0}")]
    Selection(String),

    #[error("Store closed")]
    Closed,
}

/// Rehydration errors including store failures.
#[derive(Error, Debug)]
pub enum RehydrateError {
    #[error("Core error: {0}")]
    Core(#[from] RehydrateCoreError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("State selection completed without emitting")]
    NoStateEmitted,
}

pub type Result<T> = std::result::Result<T, RehydrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let error = StoreError::Selection("reducer panicked".to_string());
        assert_eq!(error.to_string(), "State selection failed: reducer panicked");
    }

    #[test]
    fn test_from_core_error() {
        let error: RehydrateError = RehydrateCoreError::Serialization("bad".to_string()).into();
        assert!(matches!(error, RehydrateError::Core(_)));
        assert_eq!(
            error.to_string(),
            "Core error: Transfer serialization failed: bad"
        );
    }
}
