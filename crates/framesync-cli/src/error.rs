//! Error types for the framesync CLI
//!
//! Every variant carries a message meant for the person running the tool.

use framesync_core::IngestError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Process exit status for any fatal error, including usage errors.
pub const EXIT_FAILURE: i32 = 1;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Manifest could not be read or the inventory could not hold it
    #[error("Manifest ingestion failed: {0}")]
    Ingest(#[from] IngestError),

    /// Local working directory could not be created
    #[error("Cannot prepare working directory '{}': {reason}. Check permissions on the parent directory.", path.display())]
    Directory { path: PathBuf, reason: String },

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your FRAMESYNC_* environment variables.")]
    Config(String),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a working directory error
    pub fn directory(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Directory {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}
