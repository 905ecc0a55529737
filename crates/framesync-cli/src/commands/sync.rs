//! `framesync <csv_file> <remote_dir>` implementation
//!
//! Ingests the manifest, prints what was parsed, prepares the data
//! directory and pulls every frame that has not been retrieved yet.

use crate::config::Config;
use crate::error::Result;
use crate::fetch::RsyncFetcher;
use crate::progress;
use crate::render;
use crate::sync::{SyncDriver, SyncOutcome, SyncReport};
use crate::workdir;
use colored::Colorize;
use framesync_core::{ingest_path, IngestOptions, Inventory};
use std::path::Path;

/// Run a full sync
pub async fn run(csv_file: &Path, remote_dir: &str, config: &Config) -> Result<SyncReport> {
    println!("{} Manifest: {}", "→".cyan(), csv_file.display());
    println!("{} Remote directory: {}", "→".cyan(), remote_dir);

    let mut inventory = match config.max_records {
        Some(limit) => Inventory::with_limit(limit),
        None => Inventory::new(),
    };
    let options = IngestOptions::with_sentinel(&config.sentinel_column);

    let table = match ingest_path(csv_file, &options, &mut inventory) {
        Ok(table) => table,
        Err(e) => {
            eprintln!(
                "{} Ingestion stopped after {} record(s)",
                "✗".red(),
                inventory.len()
            );
            return Err(e.into());
        }
    };

    render::print_table(&table);
    if inventory.blank_count() > 0 {
        println!(
            "{} {} record(s) have no {} value and will be skipped",
            "!".yellow(),
            inventory.blank_count(),
            config.sentinel_column
        );
    }

    if workdir::ensure_dir(config.data_dir())? {
        println!("{} Created {}", "✓".green(), config.data_dir().display());
    }

    let fetcher = RsyncFetcher::new(
        config.rsync_bin.as_str(),
        config.data_dir(),
        config.fetch_timeout(),
    );
    let driver = SyncDriver::new(
        fetcher,
        config.artifact_dir(),
        config.artifact_suffix.as_str(),
    );

    let pb = progress::create_progress_bar(inventory.len() as u64, "Syncing frames");
    let report = driver
        .run(&inventory, remote_dir, |record, outcome| {
            let id = record.identifier();
            pb.suspend(|| match outcome {
                SyncOutcome::Fetched => println!("{} {} fetched", "✓".green(), id),
                SyncOutcome::AlreadyPresent => {
                    println!("{} {} already retrieved", "✓".green(), id)
                }
                SyncOutcome::Blank => println!("{} skipped record without identifier", "!".yellow()),
                SyncOutcome::Failed(e) => eprintln!("{} {} failed: {}", "✗".red(), id, e),
            });
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    print_summary(&report);
    Ok(report)
}

fn print_summary(report: &SyncReport) {
    let line = format!(
        "{} fetched, {} already retrieved, {} blank, {} failed",
        report.fetched.len(),
        report.skipped.len(),
        report.blank,
        report.failed.len()
    );
    if report.failed.is_empty() {
        println!("\n{} {}", "✓".green().bold(), line);
    } else {
        println!("\n{} {}", "!".yellow().bold(), line);
        println!("  Failed: {}", report.failed.join(", "));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tempfile::TempDir;

    fn config(root: &Path, rsync_bin: &str) -> Config {
        Config {
            data_dir: root.join("data"),
            artifact_dir: root.to_path_buf(),
            rsync_bin: rsync_bin.to_string(),
            ..Config::default()
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_fetches_missing_frames() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("frames.csv");
        std::fs::write(&csv, "FRAMEID,MJD\nA001,59000.5\nA002,59001.0\n").unwrap();
        std::fs::write(temp.path().join("A002.txt"), "").unwrap();

        let report = run(&csv, "/remote", &config(temp.path(), "true"))
            .await
            .unwrap();

        assert!(temp.path().join("data").is_dir());
        assert_eq!(report.fetched, vec!["A001"]);
        assert_eq!(report.skipped, vec!["A002"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_failed_fetches() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("frames.csv");
        std::fs::write(&csv, "FRAMEID\nB001\n").unwrap();

        let report = run(&csv, "/remote", &config(temp.path(), "false"))
            .await
            .unwrap();

        assert_eq!(report.failed, vec!["B001"]);
    }

    #[tokio::test]
    async fn test_run_capacity_exceeded() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("frames.csv");
        std::fs::write(&csv, "FRAMEID\nC001\nC002\nC003\n").unwrap();
        let mut config = config(temp.path(), "true");
        config.max_records = Some(2);

        let err = run(&csv, "/remote", &config).await.unwrap_err();
        assert!(matches!(err, CliError::Ingest(_)));
        assert!(!temp.path().join("data").exists());
    }

    #[tokio::test]
    async fn test_run_data_dir_is_file() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("frames.csv");
        std::fs::write(&csv, "FRAMEID\nD001\n").unwrap();
        std::fs::write(temp.path().join("data"), "").unwrap();

        let err = run(&csv, "/remote", &config(temp.path(), "true"))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Directory { .. }));
    }
}
