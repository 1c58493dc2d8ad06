//! Common error type for sanctix.

use sanctix_core::{LoadError, MatchError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Matcher operation error
    #[error(transparent)]
    Match(#[from] MatchError),

    /// Reference set failed validation
    #[error("reference set rejected: {0}")]
    Load(#[from] LoadError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Logging setup error
    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Result type alias using sanctix Error.
pub type Result<T> = std::result::Result<T, Error>;
