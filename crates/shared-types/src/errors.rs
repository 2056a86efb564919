//! # Error Types
//!
//! Errors raised by `ElectionStore` implementations.

use thiserror::Error;

/// Errors that can occur at the persistence boundary.
///
/// Absence of a record is not an error: lookups return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store could not be reached or timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected a write that would break a uniqueness constraint.
    #[error("duplicate {field}: {value}")]
    Duplicate { field: &'static str, value: String },

    /// A record failed its own invariants when read back.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// True for transient failures worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}
