//! Thin wrappers over `tokio::fs`
//!
//! The store treats a missing file as size 0 and deletion as idempotent;
//! every other I/O failure propagates unmasked.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Size in bytes of the file at `path`, or 0 if it does not exist.
pub(crate) async fn size_or_zero(path: &Path) -> io::Result<u64> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(meta.len()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(err) => Err(err),
    }
}

/// Delete the file at `path`; no-op if it is already gone.
pub(crate) async fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Recursively list every regular file under `root`. Ordering is
/// filesystem-dependent.
pub(crate) async fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_size_or_zero_missing_file() {
        let dir = tempdir().unwrap();
        let size = size_or_zero(&dir.path().join("absent")).await.unwrap();
        assert_eq!(size, 0);
    }

    #[tokio::test]
    async fn test_size_or_zero_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob");
        fs::write(&path, vec![0u8; 123]).await.unwrap();
        assert_eq!(size_or_zero(&path).await.unwrap(), 123);
    }

    #[tokio::test]
    async fn test_remove_if_exists_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob");
        fs::write(&path, b"x").await.unwrap();

        remove_if_exists(&path).await.unwrap();
        assert_eq!(size_or_zero(&path).await.unwrap(), 0);

        // Second delete of the same path succeeds too.
        remove_if_exists(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_files_recurses_and_skips_directories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a"), b"1").await.unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).await.unwrap();
        fs::write(dir.path().join("sub/b"), b"2").await.unwrap();
        fs::write(dir.path().join("sub/deeper/c"), b"3").await.unwrap();

        let mut files = list_files(dir.path()).await.unwrap();
        files.sort();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_list_files_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(list_files(&dir.path().join("nope")).await.is_err());
    }
}
