//! Local working directory setup

use crate::error::{CliError, Result};
use std::path::Path;
use tracing::debug;

/// Create `path` (and parents) unless it already exists.
///
/// Returns `true` when the directory was created by this call. An existing
/// path that is not a directory is an error.
pub fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    if path.exists() {
        return Err(CliError::directory(path, "exists but is not a directory"));
    }

    std::fs::create_dir_all(path).map_err(|e| CliError::directory(path, e.to_string()))?;
    debug!(path = %path.display(), "created working directory");
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_twice() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data");

        assert!(ensure_dir(&data).unwrap());
        assert!(!ensure_dir(&data).unwrap());
        assert!(data.is_dir());
    }

    #[test]
    fn test_ensure_dir_nested() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("a").join("b");

        ensure_dir(&data).unwrap();
        assert!(data.is_dir());
    }

    #[test]
    fn test_ensure_dir_on_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("data");
        std::fs::write(&file, "not a dir").unwrap();

        let err = ensure_dir(&file).unwrap_err();
        assert!(matches!(err, CliError::Directory { .. }));
    }
}
