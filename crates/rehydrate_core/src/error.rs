//! Core rehydration error types (pure - no I/O variants).

use thiserror::Error;

/// Maximum size for the serialized transfer payload (5MB).
pub const MAX_TRANSFER_PAYLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Core rehydration errors (pure - no I/O variants).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RehydrateCoreError {
    #[error("Transfer serialization failed: {0}")]
    Serialization(String),

    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("No transfer payload found for script id `{0}`")]
    MissingPayload(String),

    #[error("Invalid transfer payload: {0}")]
    InvalidPayload(String),
}

pub type Result<T> = std::result::Result<T, RehydrateCoreError>;
