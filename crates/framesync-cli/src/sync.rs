//! Sync driver
//!
//! Walks the inventory in order and fetches every identifier whose local
//! artifact (`<artifact_dir>/<identifier><suffix>`) does not exist yet.

use crate::fetch::{FetchError, RemoteFetcher};
use framesync_core::{Inventory, InventoryRecord};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// What happened to a single record
#[derive(Debug)]
pub enum SyncOutcome {
    /// Artifact was absent and the fetch succeeded
    Fetched,
    /// Artifact already exists locally
    AlreadyPresent,
    /// Record has no identifier
    Blank,
    /// Artifact was absent and the fetch failed
    Failed(FetchError),
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed(_))
    }
}

/// Per-run tally, identifiers kept in inventory order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: Vec<String>,
    pub skipped: Vec<String>,
    pub blank: usize,
    pub failed: Vec<String>,
}

impl SyncReport {
    /// Records visited
    pub fn total(&self) -> usize {
        self.fetched.len() + self.skipped.len() + self.blank + self.failed.len()
    }

    fn record(&mut self, identifier: &str, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Fetched => self.fetched.push(identifier.to_string()),
            SyncOutcome::AlreadyPresent => self.skipped.push(identifier.to_string()),
            SyncOutcome::Blank => self.blank += 1,
            SyncOutcome::Failed(_) => self.failed.push(identifier.to_string()),
        }
    }
}

/// Decides per record whether a fetch is needed and performs it
pub struct SyncDriver<F> {
    fetcher: F,
    artifact_dir: PathBuf,
    suffix: String,
}

impl<F: RemoteFetcher> SyncDriver<F> {
    pub fn new(fetcher: F, artifact_dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            fetcher,
            artifact_dir: artifact_dir.into(),
            suffix: suffix.into(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    /// Local artifact marking `identifier` as retrieved
    pub fn artifact_path(&self, identifier: &str) -> PathBuf {
        self.artifact_dir.join(format!("{}{}", identifier, self.suffix))
    }

    /// Sync one record. Fetch errors are returned as an outcome.
    pub async fn sync_record(&self, record: &InventoryRecord, remote_dir: &str) -> SyncOutcome {
        if !record.has_identifier() {
            warn!("record has no identifier, skipping");
            return SyncOutcome::Blank;
        }

        let identifier = record.identifier();
        let artifact = self.artifact_path(identifier);
        let present = match tokio::fs::try_exists(&artifact).await {
            Ok(present) => present,
            Err(e) => {
                warn!(path = %artifact.display(), error = %e, "cannot check artifact, fetching");
                false
            }
        };

        if present {
            info!(identifier, "already retrieved");
            return SyncOutcome::AlreadyPresent;
        }

        match self.fetcher.fetch(identifier, remote_dir).await {
            Ok(()) => {
                info!(identifier, "fetched");
                SyncOutcome::Fetched
            }
            Err(e) => {
                warn!(identifier, error = %e, "fetch failed, continuing");
                SyncOutcome::Failed(e)
            }
        }
    }

    /// Sync every record in inventory order.
    ///
    /// `on_outcome` is called after each record, before the next one starts.
    #[instrument(skip_all, fields(remote_dir = %remote_dir, records = inventory.len()))]
    pub async fn run(
        &self,
        inventory: &Inventory,
        remote_dir: &str,
        mut on_outcome: impl FnMut(&InventoryRecord, &SyncOutcome),
    ) -> SyncReport {
        let mut report = SyncReport::default();

        for record in inventory {
            let outcome = self.sync_record(record, remote_dir).await;
            on_outcome(record, &outcome);
            report.record(record.identifier(), &outcome);
        }

        info!(
            fetched = report.fetched.len(),
            skipped = report.skipped.len(),
            blank = report.blank,
            failed = report.failed.len(),
            "sync finished"
        );
        report
    }
}
