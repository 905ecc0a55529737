//! Streaming reader for comma-delimited manifests
//!
//! The first line of a manifest names the columns; every following line is
//! one data row. There is no quoting or escaping: a comma always separates
//! fields. Rows are normalised to the header width, so a short line is
//! padded with empty cells and a long one loses its extra fields.
//!
//! Row storage starts at [`INITIAL_ROW_CAPACITY`] and doubles whenever it is
//! full. Growth goes through `try_reserve_exact`, so an allocation failure is
//! reported as [`TableError::ResourceExhausted`] instead of aborting.

use crate::error::TableError;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, instrument, trace};

/// Maximum number of header columns kept; later names are dropped.
pub const MAX_HEADER_COLS: usize = 50;

/// Number of rows allocated before the first growth step.
pub const INITIAL_ROW_CAPACITY: usize = 10;

/// Field separator for both header and data lines.
pub const DELIMITER: char = ',';

/// Receives parse events as the reader walks the manifest.
///
/// `on_row` is called exactly once per data row, in file order, after the
/// row has been stored. Returning an error stops the reader and is passed
/// back to the caller unchanged.
pub trait RowObserver {
    type Error: From<TableError>;

    /// Called once with the retained column names
    fn on_header(&mut self, _headers: &[String]) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called for each completed row
    fn on_row(&mut self, index: usize, row: &[String]) -> Result<(), Self::Error>;
}

/// Observer that ignores every event
struct NoopObserver;

impl RowObserver for NoopObserver {
    type Error = TableError;

    fn on_row(&mut self, _index: usize, _row: &[String]) -> Result<(), TableError> {
        Ok(())
    }
}

/// A parsed manifest: column names plus rows of exactly `num_cols` cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    row_capacity: usize,
}

impl Table {
    fn with_headers(headers: Vec<String>, initial_capacity: usize) -> Result<Self, TableError> {
        let mut rows = Vec::new();
        rows.try_reserve_exact(initial_capacity)
            .map_err(|_| TableError::ResourceExhausted { rows_parsed: 0 })?;

        Ok(Self {
            headers,
            rows,
            row_capacity: initial_capacity,
        })
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of retained columns
    pub fn num_cols(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows parsed
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Rows currently allocated (always >= `num_rows`)
    pub fn capacity(&self) -> usize {
        self.row_capacity
    }

    /// Get a row by position
    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get a single cell
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Iterate over rows in file order
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Position of the first column with exactly this name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn push_row(&mut self, row: Vec<String>) -> Result<(), TableError> {
        if self.rows.len() >= self.row_capacity {
            let rows_parsed = self.rows.len();
            let grown = self
                .row_capacity
                .checked_mul(2)
                .ok_or(TableError::ResourceExhausted { rows_parsed })?;
            self.rows
                .try_reserve_exact(grown - rows_parsed)
                .map_err(|_| TableError::ResourceExhausted { rows_parsed })?;

            debug!(from = self.row_capacity, to = grown, "grew row storage");
            self.row_capacity = grown;
        }

        self.rows.push(row);
        Ok(())
    }
}

/// Reads manifests into [`Table`]s
#[derive(Debug, Clone)]
pub struct TableReader {
    initial_capacity: usize,
    max_cols: usize,
}

impl Default for TableReader {
    fn default() -> Self {
        Self {
            initial_capacity: INITIAL_ROW_CAPACITY,
            max_cols: MAX_HEADER_COLS,
        }
    }
}

impl TableReader {
    /// Create a reader with the default capacity and column limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the initial row allocation (minimum 1)
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity.max(1);
        self
    }

    /// Override the header column limit
    pub fn with_max_cols(mut self, max_cols: usize) -> Self {
        self.max_cols = max_cols;
        self
    }

    /// Read a table from any buffered source
    pub fn read<R: BufRead>(&self, reader: R) -> Result<Table, TableError> {
        self.read_observed(reader, &mut NoopObserver)
    }

    /// Open `path` and read a table from it
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Table, TableError> {
        self.read_path_observed(path, &mut NoopObserver)
    }

    /// Open `path` and read it, reporting each row to `observer`
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn read_path_observed<O: RowObserver>(
        &self,
        path: impl AsRef<Path>,
        observer: &mut O,
    ) -> Result<Table, O::Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TableError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        self.read_observed(BufReader::new(file), observer)
    }

    /// Read a table from `reader`, reporting each row to `observer`
    #[instrument(level = "debug", skip_all)]
    pub fn read_observed<R: BufRead, O: RowObserver>(
        &self,
        mut reader: R,
        observer: &mut O,
    ) -> Result<Table, O::Error> {
        let mut buf = Vec::new();

        let header_line = next_line(&mut reader, &mut buf)?.ok_or(TableError::MissingHeader)?;
        let headers = self.split_header(&header_line);
        debug!(num_cols = headers.len(), "parsed header");

        let mut table = Table::with_headers(headers, self.initial_capacity)?;
        observer.on_header(table.headers())?;

        let num_cols = table.num_cols();
        while let Some(line) = next_line(&mut reader, &mut buf)? {
            let row = split_row(&line, num_cols);
            table.push_row(row)?;

            let index = table.num_rows() - 1;
            trace!(row = index, "parsed row");
            if let Some(row) = table.row(index) {
                observer.on_row(index, row)?;
            }
        }

        debug!(
            num_rows = table.num_rows(),
            capacity = table.capacity(),
            "finished reading manifest"
        );
        Ok(table)
    }

    fn split_header(&self, line: &str) -> Vec<String> {
        if line.is_empty() {
            return Vec::new();
        }

        let mut fields = line.split(DELIMITER);
        let headers: Vec<String> = fields.by_ref().take(self.max_cols).map(str::to_owned).collect();

        let dropped = fields.count();
        if dropped > 0 {
            debug!(dropped, limit = self.max_cols, "dropping header columns beyond limit");
        }

        headers
    }
}

/// Split a data line into exactly `num_cols` cells
fn split_row(line: &str, num_cols: usize) -> Vec<String> {
    let mut cells: Vec<String> = line
        .split(DELIMITER)
        .take(num_cols)
        .map(str::to_owned)
        .collect();
    cells.resize(num_cols, String::new());
    cells
}

/// Read one line with its terminator (`\n` or `\r\n`) removed.
///
/// Returns `None` at end of input. Invalid UTF-8 is replaced rather than
/// rejected.
fn next_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>, TableError> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    let line = match String::from_utf8_lossy(buf) {
        Cow::Borrowed(s) => s.to_owned(),
        Cow::Owned(s) => s,
    };
    Ok(Some(line))
}
