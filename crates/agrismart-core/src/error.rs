//! Error types for AgriSmart Core.

use agrismart_abstraction::ModelError;
use thiserror::Error;

use crate::storage::StorageError;

/// Core error type for AgriSmart operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors, including a missing model credential.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Address parsing errors
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model-related errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for AgriSmart operations.
pub type Result<T> = std::result::Result<T, CoreError>;
