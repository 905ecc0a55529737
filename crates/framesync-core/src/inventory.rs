//! Inventory of frames discovered in a manifest
//!
//! One [`InventoryRecord`] is appended per manifest row, in row order. The
//! inventory only grows; records are never modified once appended.

use crate::error::InventoryError;
use crate::table::INITIAL_ROW_CAPACITY;
use tracing::debug;

/// Per-row summary used to drive synchronisation.
///
/// Only `identifier` is populated by ingestion today. The observation
/// metadata fields are zero until the manifest format carries them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryRecord {
    identifier: String,
    mjd: f64,
    retarder_angle: f64,
    retarder_position: f64,
    camera: u32,
    integration_time: f64,
    frame_count: u32,
}

impl InventoryRecord {
    /// Create a record for `identifier` with zeroed metadata
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Frame identifier (empty when the manifest had no identifier column)
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Modified Julian Date of the observation
    pub fn mjd(&self) -> f64 {
        self.mjd
    }

    /// Retarder angle in degrees
    pub fn retarder_angle(&self) -> f64 {
        self.retarder_angle
    }

    /// Retarder position in degrees
    pub fn retarder_position(&self) -> f64 {
        self.retarder_position
    }

    /// Camera index
    pub fn camera(&self) -> u32 {
        self.camera
    }

    /// Integration time per frame, in seconds
    pub fn integration_time(&self) -> f64 {
        self.integration_time
    }

    /// Number of frames in the file
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Whether the record carries an identifier
    pub fn has_identifier(&self) -> bool {
        !self.identifier.is_empty()
    }
}

/// Append-only ordered collection of [`InventoryRecord`]s
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    records: Vec<InventoryRecord>,
    capacity: usize,
    limit: Option<usize>,
}

impl Inventory {
    /// Create an unbounded inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an inventory that refuses to hold more than `limit` records
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Create an unbounded inventory with room for `capacity` records
    ///
    /// Fails with [`InventoryError::ResourceExhausted`] when the storage
    /// cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, InventoryError> {
        let mut records = Vec::new();
        records
            .try_reserve_exact(capacity)
            .map_err(|_| InventoryError::ResourceExhausted { records: 0 })?;

        Ok(Self {
            records,
            capacity,
            limit: None,
        })
    }

    /// Append a record.
    ///
    /// Fails with [`InventoryError::CapacityExceeded`] once the limit is
    /// reached; records already appended are kept.
    pub fn push(&mut self, record: InventoryRecord) -> Result<(), InventoryError> {
        let len = self.records.len();

        if let Some(limit) = self.limit {
            if len >= limit {
                return Err(InventoryError::CapacityExceeded { limit });
            }
        }

        if len >= self.capacity {
            let grown = if self.capacity == 0 {
                INITIAL_ROW_CAPACITY
            } else {
                self.capacity
                    .checked_mul(2)
                    .ok_or(InventoryError::ResourceExhausted { records: len })?
            };
            self.records
                .try_reserve_exact(grown - len)
                .map_err(|_| InventoryError::ResourceExhausted { records: len })?;

            debug!(from = self.capacity, to = grown, "grew inventory storage");
            self.capacity = grown;
        }

        self.records.push(record);
        Ok(())
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the inventory has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records currently allocated
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Configured record limit, if any
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Get a record by position
    pub fn get(&self, index: usize) -> Option<&InventoryRecord> {
        self.records.get(index)
    }

    /// Iterate over records in manifest order
    pub fn iter(&self) -> std::slice::Iter<'_, InventoryRecord> {
        self.records.iter()
    }

    /// Iterate over identifiers in manifest order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(InventoryRecord::identifier)
    }

    /// Number of records with an empty identifier
    pub fn blank_count(&self) -> usize {
        self.records.iter().filter(|r| !r.has_identifier()).count()
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a InventoryRecord;
    type IntoIter = std::slice::Iter<'a, InventoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
