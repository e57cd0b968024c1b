//! Error types for rollcall-core operations.

use std::path::PathBuf;

use rollcall_protocol::ErrorInfo;

/// Failures a status store can report.
///
/// Reading or deleting a member that has no record is not an error; those
/// calls succeed and leave the map as it was.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing medium (network, file) could not be reached, read or written.
    #[error("Status store unavailable: {0}")]
    Unavailable(String),

    /// Member or record missing or malformed on a write.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    pub fn unavailable(context: &str, err: impl std::fmt::Display) -> Self {
        StoreError::Unavailable(format!("{}: {}", context, err))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<ErrorInfo> for StoreError {
    fn from(info: ErrorInfo) -> Self {
        StoreError::InvalidInput(info.message)
    }
}

/// All other errors that can occur in rollcall-core operations.
#[derive(Debug, thiserror::Error)]
pub enum RollcallError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using RollcallError.
pub type Result<T> = std::result::Result<T, RollcallError>;
