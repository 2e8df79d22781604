//! Startup sweep of the CSV staging directory.
//!
//! Import uploads are written to `UPLOAD_TMP_DIR` and removed once parsed.
//! A crash mid-import leaves the file behind, so anything still there when
//! the server starts is stale.

use std::path::{Path, PathBuf};

/// Remove every regular file in `dir`. A missing directory is created.
///
/// Returns the number of files removed.
pub async fn clean_dir(dir: &Path) -> std::io::Result<usize> {
    tokio::fs::create_dir_all(dir).await?;

    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::warn!(error = %e, path = %entry.path().display(), "Failed to remove staged upload");
            }
        }
    }
    Ok(removed)
}

/// Spawnable wrapper around [`clean_dir`] that logs its outcome.
pub async fn run(dir: PathBuf) {
    match clean_dir(&dir).await {
        Ok(0) => tracing::debug!(dir = %dir.display(), "Staging directory already clean"),
        Ok(removed) => {
            tracing::info!(dir = %dir.display(), removed, "Removed stale staged uploads")
        }
        Err(e) => tracing::error!(error = %e, dir = %dir.display(), "Staging cleanup failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_files_and_keeps_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.csv"), b"x").await.unwrap();
        tokio::fs::write(dir.path().join("b.csv"), b"y").await.unwrap();
        tokio::fs::create_dir(dir.path().join("keep")).await.unwrap();

        assert_eq!(clean_dir(dir.path()).await.unwrap(), 2);
        assert!(dir.path().join("keep").is_dir());
        assert!(!dir.path().join("a.csv").exists());
    }

    #[tokio::test]
    async fn missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staging");
        assert_eq!(clean_dir(&staging).await.unwrap(), 0);
        assert!(staging.is_dir());
    }
}
