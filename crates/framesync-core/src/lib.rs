//! framesync core library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Manifest ingestion for observation frame synchronisation.
//!
//! # Overview
//!
//! This crate turns a comma-delimited manifest into an inventory of frame
//! identifiers that downstream tooling synchronises from a remote archive:
//!
//! - **Table Reader**: Streams a header plus data lines into a [`Table`]
//! - **Identifier Extraction**: Copies the sentinel column of each row into a record
//! - **Inventory**: Ordered, append-only collection of [`InventoryRecord`]s
//! - **Logging**: Shared tracing subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use framesync_core::{ingest_path, IngestOptions, Inventory};
//!
//! fn list_frames(path: &str) -> framesync_core::Result<()> {
//!     let mut inventory = Inventory::new();
//!     ingest_path(path, &IngestOptions::default(), &mut inventory)?;
//!     for record in inventory.iter() {
//!         println!("{}", record.identifier());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod extract;
pub mod ingest;
pub mod inventory;
pub mod logging;
pub mod table;

// Re-export commonly used types
pub use error::{IngestError, InventoryError, Result, TableError};
pub use extract::{ColumnMap, IdentifierExtractor, DEFAULT_SENTINEL_COLUMN, MAX_IDENTIFIER_LEN};
pub use ingest::{ingest_path, ingest_reader, IngestOptions};
pub use inventory::{Inventory, InventoryRecord};
pub use table::{RowObserver, Table, TableReader, INITIAL_ROW_CAPACITY, MAX_HEADER_COLS};
