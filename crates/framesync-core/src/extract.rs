//! Identifier extraction
//!
//! Binds the sentinel column by name once the header is known, then turns
//! every parsed row into an [`InventoryRecord`].

use crate::error::IngestError;
use crate::inventory::{Inventory, InventoryRecord};
use crate::table::RowObserver;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Header name of the column holding the frame identifier.
pub const DEFAULT_SENTINEL_COLUMN: &str = "FRAMEID";

/// Longest identifier kept, in characters. Longer values are cut.
pub const MAX_IDENTIFIER_LEN: usize = 100;

/// Header name to column position lookup.
///
/// When a name appears more than once the last column wins.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    index: HashMap<String, usize>,
}

impl ColumnMap {
    /// Build the lookup from header names
    pub fn from_headers(headers: &[String]) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { index }
    }

    /// Column position for `name`
    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no columns were mapped
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Cut `value` to at most [`MAX_IDENTIFIER_LEN`] characters
pub fn truncate_identifier(value: &str) -> String {
    value.chars().take(MAX_IDENTIFIER_LEN).collect()
}

/// Row observer that appends one inventory record per row
pub struct IdentifierExtractor<'a> {
    sentinel: String,
    column: Option<usize>,
    inventory: &'a mut Inventory,
}

impl<'a> IdentifierExtractor<'a> {
    /// Extract the [`DEFAULT_SENTINEL_COLUMN`] into `inventory`
    pub fn new(inventory: &'a mut Inventory) -> Self {
        Self::with_sentinel(DEFAULT_SENTINEL_COLUMN, inventory)
    }

    /// Extract a custom column into `inventory`
    pub fn with_sentinel(sentinel: impl Into<String>, inventory: &'a mut Inventory) -> Self {
        Self {
            sentinel: sentinel.into(),
            column: None,
            inventory,
        }
    }

    /// Resolved position of the sentinel column, once the header was seen
    pub fn column(&self) -> Option<usize> {
        self.column
    }

    /// Name of the column being extracted
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }
}

impl RowObserver for IdentifierExtractor<'_> {
    type Error = IngestError;

    fn on_header(&mut self, headers: &[String]) -> Result<(), IngestError> {
        let columns = ColumnMap::from_headers(headers);
        self.column = columns.get(&self.sentinel);

        match self.column {
            Some(index) => debug!(column = %self.sentinel, index, "resolved identifier column"),
            None => warn!(
                column = %self.sentinel,
                "identifier column not found in header; records will have empty identifiers"
            ),
        }
        Ok(())
    }

    fn on_row(&mut self, _index: usize, row: &[String]) -> Result<(), IngestError> {
        let identifier = self
            .column
            .and_then(|col| row.get(col))
            .map(|value| truncate_identifier(value))
            .unwrap_or_default();

        self.inventory.push(InventoryRecord::new(identifier))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::InventoryError;
    use crate::table::TableReader;
    use std::io::Cursor;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_column_map_lookup() {
        let map = ColumnMap::from_headers(&headers(&["MJD", "FRAMEID", "TINT"]));

        assert_eq!(map.get("FRAMEID"), Some(1));
        assert_eq!(map.get("frameid"), None);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_column_map_duplicate_names_last_wins() {
        let map = ColumnMap::from_headers(&headers(&["FRAMEID", "MJD", "FRAMEID"]));
        assert_eq!(map.get("FRAMEID"), Some(2));
    }

    #[test]
    fn test_truncate_identifier() {
        let long = "X".repeat(150);
        assert_eq!(truncate_identifier(&long).chars().count(), MAX_IDENTIFIER_LEN);
        assert_eq!(truncate_identifier("A001"), "A001");
    }

    #[test]
    fn test_extracts_sentinel_column() {
        let mut inventory = Inventory::new();
        let mut extractor = IdentifierExtractor::new(&mut inventory);
        TableReader::new()
            .read_observed(
                Cursor::new("MJD,FRAMEID\n59000.5,A001\n59001.0,A002\n"),
                &mut extractor,
            )
            .unwrap();
        assert_eq!(extractor.column(), Some(1));

        let ids: Vec<&str> = inventory.identifiers().collect();
        assert_eq!(ids, vec!["A001", "A002"]);
    }

    #[test]
    fn test_missing_sentinel_gives_empty_identifiers() {
        let mut inventory = Inventory::new();
        let mut extractor = IdentifierExtractor::new(&mut inventory);
        let table = TableReader::new()
            .read_observed(Cursor::new("MJD,TINT\n1,2\n3,4\n"), &mut extractor)
            .unwrap();
        assert_eq!(extractor.column(), None);

        assert_eq!(table.num_rows(), 2);
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.blank_count(), 2);
    }

    #[test]
    fn test_short_row_gives_empty_identifier() {
        let mut inventory = Inventory::new();
        let mut extractor = IdentifierExtractor::new(&mut inventory);
        TableReader::new()
            .read_observed(Cursor::new("MJD,FRAMEID\n59000.5\n"), &mut extractor)
            .unwrap();

        assert_eq!(inventory.get(0).unwrap().identifier(), "");
    }

    #[test]
    fn test_custom_sentinel() {
        let mut inventory = Inventory::new();
        let mut extractor = IdentifierExtractor::with_sentinel("FILE", &mut inventory);
        assert_eq!(extractor.sentinel(), "FILE");
        TableReader::new()
            .read_observed(Cursor::new("FRAMEID,FILE\nA,B\n"), &mut extractor)
            .unwrap();

        assert_eq!(inventory.get(0).unwrap().identifier(), "B");
    }

    #[test]
    fn test_long_identifier_is_truncated() {
        let input = format!("FRAMEID\n{}\n", "Z".repeat(120));
        let mut inventory = Inventory::new();
        let mut extractor = IdentifierExtractor::new(&mut inventory);
        TableReader::new()
            .read_observed(Cursor::new(input), &mut extractor)
            .unwrap();

        assert_eq!(inventory.get(0).unwrap().identifier(), "Z".repeat(100));
    }

    #[test]
    fn test_inventory_limit_aborts_extraction() {
        let mut inventory = Inventory::with_limit(2);
        let mut extractor = IdentifierExtractor::new(&mut inventory);
        let err = TableReader::new()
            .read_observed(Cursor::new("FRAMEID\nA\nB\nC\n"), &mut extractor)
            .unwrap_err();

        assert!(matches!(
            err,
            IngestError::Inventory(InventoryError::CapacityExceeded { limit: 2 })
        ));
        assert_eq!(inventory.len(), 2);
    }
}
