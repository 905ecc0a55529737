//! Remote fetch collaborator
//!
//! [`RemoteFetcher`] is the seam the sync driver calls for every identifier
//! that has no local artifact. The production implementation shells out to
//! `rsync` through a [`CommandRunner`], which tests replace with a fake.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors from a single fetch. Never fatal to a sync run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Fetch did not finish within {}s", timeout.as_secs())]
    TimedOut { timeout: Duration },

    #[error("Fetch exited with status {status}: {}", stderr.trim())]
    Failed { status: i32, stderr: String },
}

/// Captured result of a finished child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs an external program to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CmdOutput, FetchError>;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    #[instrument(level = "debug", skip(self, args))]
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CmdOutput, FetchError> {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the output future on timeout kills the child.
        let out = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| FetchError::TimedOut { timeout })?
            .map_err(|source| FetchError::Launch {
                program: program.to_string(),
                source,
            })?;

        Ok(CmdOutput {
            status: out.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&out.stdout).to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).to_string(),
        })
    }
}

/// Retrieves every remote file belonging to one identifier
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch(&self, identifier: &str, remote_dir: &str) -> Result<(), FetchError>;
}

/// Fetches `<identifier>*` from a remote directory with `rsync -au`
///
/// Files are never deleted at the destination and only replaced when the
/// remote copy is newer.
#[derive(Debug, Clone)]
pub struct RsyncFetcher<R = TokioCommandRunner> {
    runner: R,
    program: String,
    dest_dir: PathBuf,
    timeout: Duration,
}

impl RsyncFetcher<TokioCommandRunner> {
    pub fn new(program: impl Into<String>, dest_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::with_runner(TokioCommandRunner, program, dest_dir, timeout)
    }
}

impl<R: CommandRunner> RsyncFetcher<R> {
    pub fn with_runner(
        runner: R,
        program: impl Into<String>,
        dest_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            program: program.into(),
            dest_dir: dest_dir.into(),
            timeout,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Argument list for fetching `identifier` from `remote_dir`
    pub fn args(&self, identifier: &str, remote_dir: &str) -> Vec<String> {
        vec![
            "-au".to_string(),
            "--include".to_string(),
            format!("{}*", escape_pattern(identifier)),
            "--exclude".to_string(),
            "*".to_string(),
            with_trailing_slash(remote_dir),
            with_trailing_slash(&self.dest_dir.to_string_lossy()),
        ]
    }
}

#[async_trait]
impl<R: CommandRunner> RemoteFetcher for RsyncFetcher<R> {
    #[instrument(skip(self))]
    async fn fetch(&self, identifier: &str, remote_dir: &str) -> Result<(), FetchError> {
        let args = self.args(identifier, remote_dir);
        debug!(program = %self.program, ?args, "running fetch");

        let out = self.runner.run(&self.program, &args, self.timeout).await?;
        if out.success() {
            if !out.stdout.trim().is_empty() {
                debug!(stdout = %out.stdout.trim(), "fetch output");
            }
            return Ok(());
        }

        warn!(status = out.status, stderr = %out.stderr.trim(), "fetch failed");
        Err(FetchError::Failed {
            status: out.status,
            stderr: out.stderr,
        })
    }
}

/// Escape rsync filter wildcards so the identifier matches literally
fn escape_pattern(identifier: &str) -> String {
    let mut escaped = String::with_capacity(identifier.len());
    for c in identifier.chars() {
        if matches!(c, '*' | '?' | '[' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn with_trailing_slash(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRunner {
        status: i32,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(
            &self,
            program: &str,
            args: &[String],
            _timeout: Duration,
        ) -> Result<CmdOutput, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            Ok(CmdOutput {
                status: self.status,
                stdout: String::new(),
                stderr: "rsync: link_stat failed\n".to_string(),
            })
        }
    }

    fn fetcher(status: i32) -> RsyncFetcher<FakeRunner> {
        RsyncFetcher::with_runner(
            FakeRunner {
                status,
                ..Default::default()
            },
            "rsync",
            "./data",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_args() {
        let args = fetcher(0).args("X001", "host:/archive/2024");
        assert_eq!(
            args,
            vec![
                "-au",
                "--include",
                "X001*",
                "--exclude",
                "*",
                "host:/archive/2024/",
                "./data/"
            ]
        );
    }

    #[test]
    fn test_args_keep_existing_slash_and_escape_wildcards() {
        let args = fetcher(0).args("A*[1]?", "/archive/");
        assert_eq!(args[2], "A\\*\\[1]\\?*");
        assert_eq!(args[5], "/archive/");
    }

    #[tokio::test]
    async fn test_zero_status_is_success() {
        let fetcher = fetcher(0);
        fetcher.fetch("X001", "/archive").await.unwrap();

        let calls = fetcher.runner().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "rsync");
        assert_eq!(calls[0].1[2], "X001*");
    }

    #[tokio::test]
    async fn test_nonzero_status_is_failure() {
        let err = fetcher(23).fetch("X001", "/archive").await.unwrap_err();
        match err {
            FetchError::Failed { status, stderr } => {
                assert_eq!(status, 23);
                assert!(stderr.contains("link_stat"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let err = TokioCommandRunner
            .run("framesync-no-such-program", &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_command_status() {
        let out = TokioCommandRunner
            .run("false", &[], Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!out.success());

        let out = TokioCommandRunner
            .run("true", &[], Duration::from_secs(5))
            .await
            .unwrap();
        assert!(out.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let err = TokioCommandRunner
            .run("sleep", &["5".to_string()], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TimedOut { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_command_captures_stdout() {
        let out = TokioCommandRunner
            .run("echo", &["X001.fits".to_string()], Duration::from_secs(5))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "X001.fits");
    }
}
