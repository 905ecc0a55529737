//! Configuration management for the framesync CLI
//!
//! Every setting has a default and can be overridden through a
//! `FRAMESYNC_*` environment variable (or a `.env` file read at startup).

use crate::error::{CliError, Result};
use framesync_core::DEFAULT_SENTINEL_COLUMN;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Directory that receives fetched frame files.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Directory searched for already-retrieved artifacts.
pub const DEFAULT_ARTIFACT_DIR: &str = ".";

/// Suffix appended to an identifier to name its local artifact.
pub const DEFAULT_ARTIFACT_SUFFIX: &str = ".txt";

/// Program used for remote transfers.
pub const DEFAULT_RSYNC_BIN: &str = "rsync";

/// Upper bound on a single fetch, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 600;

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Fetch destination
    pub data_dir: PathBuf,

    /// Where `<identifier><suffix>` artifacts are looked up
    pub artifact_dir: PathBuf,

    /// Artifact file suffix
    pub artifact_suffix: String,

    /// Header name of the identifier column
    pub sentinel_column: String,

    /// rsync executable
    pub rsync_bin: String,

    /// Per-fetch timeout in seconds
    pub fetch_timeout_secs: u64,

    /// Maximum number of inventory records, unbounded when `None`
    pub max_records: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
            sentinel_column: DEFAULT_SENTINEL_COLUMN.to_string(),
            rsync_bin: DEFAULT_RSYNC_BIN.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_records: None,
        }
    }
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        if let Ok(dir) = std::env::var("FRAMESYNC_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("FRAMESYNC_ARTIFACT_DIR") {
            config.artifact_dir = PathBuf::from(dir);
        }

        if let Ok(suffix) = std::env::var("FRAMESYNC_ARTIFACT_SUFFIX") {
            config.artifact_suffix = suffix;
        }

        if let Ok(column) = std::env::var("FRAMESYNC_SENTINEL_COLUMN") {
            config.sentinel_column = column;
        }

        if let Ok(bin) = std::env::var("FRAMESYNC_RSYNC_BIN") {
            config.rsync_bin = bin;
        }

        if let Ok(secs) = std::env::var("FRAMESYNC_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout_secs = parse_var("FRAMESYNC_FETCH_TIMEOUT_SECS", &secs)?;
        }

        if let Ok(max) = std::env::var("FRAMESYNC_MAX_RECORDS") {
            config.max_records = Some(parse_var("FRAMESYNC_MAX_RECORDS", &max)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the sync cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.rsync_bin.trim().is_empty() {
            return Err(CliError::config("FRAMESYNC_RSYNC_BIN must not be empty"));
        }
        if self.sentinel_column.is_empty() {
            return Err(CliError::config("FRAMESYNC_SENTINEL_COLUMN must not be empty"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(CliError::config(
                "FRAMESYNC_FETCH_TIMEOUT_SECS must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the artifact directory path
    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    /// Per-fetch timeout
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CliError::config(format!("{name}='{value}' is invalid: {e}")))
}
