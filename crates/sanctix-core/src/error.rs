//! Matcher error types

use thiserror::Error;

use crate::model::EntityKey;

/// Errors raised while validating and indexing a reference set.
///
/// Any of these aborts initialization; no partially built matcher is exposed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The entity table lists the same key twice
    #[error("duplicate entity key: {0}")]
    DuplicateEntity(EntityKey),

    /// An alias, address, or identifier row points at an entity that was never loaded
    #[error("{table} row references unknown entity {key}")]
    OrphanReference { table: &'static str, key: EntityKey },

    /// A required field is blank (or has nothing left after normalization)
    #[error("{table} row {row}: missing required field '{field}'")]
    MissingField {
        table: &'static str,
        row: usize,
        field: &'static str,
    },

    /// An entity key that is not a non-negative integer
    #[error("invalid entity key: {0:?}")]
    InvalidKey(String),
}

/// Errors returned by matcher operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Profile lookup for a key absent from the loaded reference set
    #[error("entity not found: {0}")]
    NotFound(EntityKey),
}

/// Result type for matcher operations
pub type Result<T> = std::result::Result<T, MatchError>;
