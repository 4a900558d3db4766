//! Error types for xorlist.

use std::collections::TryReserveError;
use thiserror::Error;

/// Result type alias using XorListError.
pub type Result<T> = std::result::Result<T, XorListError>;

/// Errors that can occur in xorlist operations.
#[derive(Debug, Error)]
pub enum XorListError {
    // Lifecycle errors
    #[error("Operation on freed list")]
    FreedList,

    #[error("List already freed")]
    AlreadyFreed,

    // Structural errors
    #[error("Operation on empty list")]
    EmptyList,

    #[error("List modified during iteration")]
    ModifiedDuringIteration,

    // Arena errors
    #[error("Block allocation failed: {capacity} nodes")]
    AllocationFailed {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },

    // Configuration errors
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: String },

    // Output errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl XorListError {
    /// Returns true if the error was caused by using a freed list.
    pub fn is_freed(&self) -> bool {
        matches!(self, Self::FreedList | Self::AlreadyFreed)
    }
}
