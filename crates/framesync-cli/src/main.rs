//! framesync - Main entry point

use clap::error::ErrorKind;
use clap::Parser;
use framesync_cli::{commands, Cli, Config};
use framesync_core::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::{debug, error};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    // Usage errors exit with status 1
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("framesync")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _ = init_logging(&log_config);

    if !cli.extra.is_empty() {
        debug!(ignored = ?cli.extra, "ignoring extra arguments");
    }

    let result = match Config::from_env() {
        Ok(config) => commands::sync::run(&cli.csv_file, &cli.remote_dir, &config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}
