//! Manifest ingestion pipeline
//!
//! Reads a manifest and fills an [`Inventory`] in a single pass. The
//! inventory is owned by the caller, so records collected before a failure
//! remain available for reporting.

use crate::error::Result;
use crate::extract::{IdentifierExtractor, DEFAULT_SENTINEL_COLUMN};
use crate::inventory::Inventory;
use crate::table::{Table, TableReader, INITIAL_ROW_CAPACITY, MAX_HEADER_COLS};
use std::io::BufRead;
use std::path::Path;
use tracing::{info, instrument};

/// Knobs for a single ingestion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Header name of the identifier column
    pub sentinel_column: String,

    /// Rows allocated before the first growth step
    pub initial_capacity: usize,

    /// Header columns kept
    pub max_cols: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            sentinel_column: DEFAULT_SENTINEL_COLUMN.to_string(),
            initial_capacity: INITIAL_ROW_CAPACITY,
            max_cols: MAX_HEADER_COLS,
        }
    }
}

impl IngestOptions {
    /// Options with a custom identifier column
    pub fn with_sentinel(sentinel_column: impl Into<String>) -> Self {
        Self {
            sentinel_column: sentinel_column.into(),
            ..Self::default()
        }
    }

    fn reader(&self) -> TableReader {
        TableReader::new()
            .with_initial_capacity(self.initial_capacity)
            .with_max_cols(self.max_cols)
    }
}

/// Read a manifest from `reader`, appending one record per row to `inventory`
pub fn ingest_reader<R: BufRead>(
    reader: R,
    options: &IngestOptions,
    inventory: &mut Inventory,
) -> Result<Table> {
    let mut extractor = IdentifierExtractor::with_sentinel(&options.sentinel_column, inventory);
    options.reader().read_observed(reader, &mut extractor)
}

/// Read the manifest at `path`, appending one record per row to `inventory`
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn ingest_path(
    path: impl AsRef<Path>,
    options: &IngestOptions,
    inventory: &mut Inventory,
) -> Result<Table> {
    let mut extractor = IdentifierExtractor::with_sentinel(&options.sentinel_column, inventory);
    let table = options
        .reader()
        .read_path_observed(path.as_ref(), &mut extractor)?;

    info!(
        columns = table.num_cols(),
        rows = table.num_rows(),
        records = inventory.len(),
        "ingested manifest"
    );
    Ok(table)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::{IngestError, TableError};
    use proptest::prelude::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn manifest(rows: usize) -> String {
        let mut s = String::from("FRAMEID,MJD,TINT\n");
        for i in 0..rows {
            s.push_str(&format!("OBS{:03},{}.5,0.8\n", i, 59000 + i));
        }
        s
    }

    #[test]
    fn test_record_count_matches_rows_at_growth_boundaries() {
        for n in [9, 10, 11, 19, 20, 21] {
            let mut inventory = Inventory::new();
            let table =
                ingest_reader(Cursor::new(manifest(n)), &IngestOptions::default(), &mut inventory)
                    .unwrap();

            assert_eq!(table.num_rows(), n);
            assert_eq!(inventory.len(), n);
            assert_eq!(inventory.get(n - 1).unwrap().identifier(), format!("OBS{:03}", n - 1));
        }
    }

    #[test]
    fn test_ingest_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "FRAMEID,MJD,TINT\nA001,59000.5,1.2\nA002,59001.0,0.8\n").unwrap();

        let mut inventory = Inventory::new();
        let table = ingest_path(file.path(), &IngestOptions::default(), &mut inventory).unwrap();

        assert_eq!(table.num_cols(), 3);
        assert_eq!(table.num_rows(), 2);
        let ids: Vec<&str> = inventory.identifiers().collect();
        assert_eq!(ids, vec!["A001", "A002"]);
    }

    #[test]
    fn test_ingest_missing_file() {
        let mut inventory = Inventory::new();
        let err = ingest_path(
            "/nonexistent/frames.csv",
            &IngestOptions::default(),
            &mut inventory,
        )
        .unwrap_err();

        assert!(matches!(err, IngestError::Table(TableError::Open { .. })));
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_capacity_exceeded_keeps_collected_records() {
        let mut inventory = Inventory::with_limit(5);
        let err = ingest_reader(Cursor::new(manifest(8)), &IngestOptions::default(), &mut inventory)
            .unwrap_err();

        assert!(matches!(err, IngestError::Inventory(_)));
        assert_eq!(inventory.len(), 5);
        assert_eq!(inventory.get(4).unwrap().identifier(), "OBS004");
    }

    #[test]
    fn test_custom_sentinel_option() {
        let mut inventory = Inventory::new();
        ingest_reader(
            Cursor::new("NAME,FRAMEID\nfirst,A\n"),
            &IngestOptions::with_sentinel("NAME"),
            &mut inventory,
        )
        .unwrap();

        assert_eq!(inventory.get(0).unwrap().identifier(), "first");
    }

    proptest! {
        #[test]
        fn prop_one_record_per_data_line(
            rows in proptest::collection::vec("[A-Z0-9]{0,12}(,[0-9.]{0,6}){0,4}", 0..80),
            capacity in 1usize..16,
        ) {
            let mut input = String::from("FRAMEID,MJD,TINT\n");
            for row in &rows {
                input.push_str(row);
                input.push('\n');
            }

            let options = IngestOptions { initial_capacity: capacity, ..IngestOptions::default() };
            let mut inventory = Inventory::new();
            let table = ingest_reader(Cursor::new(input), &options, &mut inventory).unwrap();

            prop_assert_eq!(table.num_rows(), rows.len());
            prop_assert_eq!(inventory.len(), rows.len());
            for (i, row) in rows.iter().enumerate() {
                let expected = row.split(',').next().unwrap_or_default();
                prop_assert_eq!(inventory.get(i).unwrap().identifier(), expected);
                prop_assert_eq!(table.row(i).unwrap().len(), 3);
            }
        }
    }
}
