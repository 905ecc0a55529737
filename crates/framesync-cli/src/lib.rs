//! framesync CLI library
//!
//! Reads an observation manifest and pulls every listed frame that is not
//! yet present locally from a remote archive.
//!
//! # Overview
//!
//! - **Ingestion**: Parse the manifest and collect frame identifiers (`framesync-core`)
//! - **Working directory**: Make sure the local data directory exists
//! - **Sync**: For each identifier without a local artifact, fetch its files
//! - **Fetch**: `rsync`-backed transfer behind the [`fetch::RemoteFetcher`] trait

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod commands;
pub mod config;
pub mod error;
pub mod fetch;
pub mod progress;
pub mod render;
pub mod sync;
pub mod workdir;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};

use clap::Parser;
use std::path::PathBuf;

/// framesync - pull observation frames listed in a manifest
#[derive(Parser, Debug)]
#[command(name = "framesync")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Manifest file (comma-separated, first line names the columns)
    pub csv_file: PathBuf,

    /// Remote directory holding the frame files (local path or rsync remote)
    pub remote_dir: String,

    /// Extra arguments are accepted and ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positionals() {
        let cli = Cli::try_parse_from(["framesync", "-v", "frames.csv", "/remote"]).unwrap();
        assert_eq!(cli.csv_file, PathBuf::from("frames.csv"));
        assert_eq!(cli.remote_dir, "/remote");
        assert!(cli.verbose);
        assert!(cli.extra.is_empty());
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        let cli =
            Cli::try_parse_from(["framesync", "frames.csv", "/remote", "extra", "--more"]).unwrap();
        assert_eq!(cli.remote_dir, "/remote");
        assert_eq!(cli.extra, vec!["extra", "--more"]);
    }

    #[test]
    fn test_missing_remote_dir_is_an_error() {
        assert!(Cli::try_parse_from(["framesync", "frames.csv"]).is_err());
    }
}
