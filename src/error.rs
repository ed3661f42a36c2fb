//! Error types for Agassi
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using AgassiError
pub type Result<T> = std::result::Result<T, AgassiError>;

/// Unified error type for Agassi operations
#[derive(Debug, Error)]
pub enum AgassiError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    /// The backing file could not be opened, locked or created
    #[error("store unavailable at {}: {reason}", .path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    /// A transaction could not be started or committed
    #[error("{op}: transaction failed: {reason}")]
    Transaction { op: &'static str, reason: String },

    #[error("{op} on bucket {bucket} failed: {reason}")]
    Storage {
        op: &'static str,
        bucket: &'static str,
        reason: String,
    },

    #[error("key {key} already in bucket {bucket}")]
    DuplicateKey { bucket: &'static str, key: String },

    #[error("key {key} not found in bucket {bucket}")]
    NotFound { bucket: &'static str, key: String },

    #[error("store is closed")]
    Closed,

    #[error("can't close store: {0}")]
    Close(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("can't encode {kind}: {reason}")]
    Encode { kind: &'static str, reason: String },

    #[error("can't decode {bucket}/{key}: {reason}")]
    Decode {
        bucket: &'static str,
        key: String,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgassiError {
    /// True for failures a caller may reasonably recover from
    /// (pick another id, look up a different record)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgassiError::DuplicateKey { .. } | AgassiError::NotFound { .. }
        )
    }
}
