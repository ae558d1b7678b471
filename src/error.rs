//! Error types for linkdb
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using LinkError
pub type Result<T> = std::result::Result<T, LinkError>;

/// Unified error type for linkdb operations
#[derive(Debug, Error)]
pub enum LinkError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data file unavailable: {}", path.display())]
    FileUnavailable { path: PathBuf },

    // -------------------------------------------------------------------------
    // Record File Errors
    // -------------------------------------------------------------------------
    #[error("Short read at slot {offset}")]
    ShortRead { offset: u32 },

    #[error("Slot {offset} out of range (file holds {slots} slots)")]
    OffsetOutOfRange { offset: u32, slots: u32 },

    #[error("Corruption detected: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Operation Errors
    // -------------------------------------------------------------------------
    #[error("{0} not found")]
    NotFound(String),

    #[error("Key {0} already exists")]
    DuplicateKey(i32),

    #[error("Invalid field selection: {0}")]
    InvalidSelection(u8),

    #[error("Field `{field}` too long: {len} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LinkError {
    /// Whether the error only aborts the current operation and leaves the
    /// store in a usable state (bad input, missing key).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LinkError::NotFound(_)
                | LinkError::DuplicateKey(_)
                | LinkError::InvalidSelection(_)
                | LinkError::FieldTooLong { .. }
                | LinkError::InvalidValue(_)
        )
    }
}

impl From<bincode::Error> for LinkError {
    fn from(e: bincode::Error) -> Self {
        LinkError::Serialization(e.to_string())
    }
}
