//! Error types for manifest ingestion

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors raised while reading a manifest into a [`crate::Table`].
///
/// Short or over-long rows are not errors: they are padded or truncated
/// in place and never leave the reader.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Cannot open manifest '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error while reading manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest is empty: no header line found")]
    MissingHeader,

    #[error("Row storage could not grow; {rows_parsed} row(s) were parsed before the failure")]
    ResourceExhausted { rows_parsed: usize },
}

impl TableError {
    /// Number of rows parsed before the reader gave up, when known
    pub fn rows_parsed(&self) -> Option<usize> {
        match self {
            TableError::ResourceExhausted { rows_parsed } => Some(*rows_parsed),
            _ => None,
        }
    }
}

/// Errors raised while appending to an [`crate::Inventory`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Inventory capacity exceeded: at most {limit} record(s) allowed")]
    CapacityExceeded { limit: usize },

    #[error("Inventory storage could not grow beyond {records} record(s)")]
    ResourceExhausted { records: usize },
}

/// Error for the combined read-and-extract pipeline
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}
