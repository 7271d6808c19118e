//! Directory-restore pass
//!
//! Rebuilds the entry index from whatever files already exist under the
//! store root. Each file's key is its base name; restored entries are always
//! idle. Restore never evicts, even when the restored total exceeds capacity.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use crate::disk;

/// Restore-time hook: returns `false` to reject a discovered file, which is
/// then deleted and left unindexed.
pub(crate) type IntegrityCheck = Box<dyn Fn(&Path, u64) -> bool + Send + Sync>;

pub(crate) struct RestoredEntry {
    pub key: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Create the root directory if absent, then scan it for entries.
/// Entry order is directory-listing order, which is filesystem-dependent.
pub(crate) async fn scan_root(
    root: &Path,
    check: Option<&IntegrityCheck>,
) -> io::Result<Vec<RestoredEntry>> {
    fs::create_dir_all(root).await?;
    let files = disk::list_files(root).await?;
    collect_entries(files, check).await
}

/// Stat and key each listed file, preserving list order.
async fn collect_entries(
    files: Vec<PathBuf>,
    check: Option<&IntegrityCheck>,
) -> io::Result<Vec<RestoredEntry>> {
    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        // touch() only ever produces UTF-8 names; anything else was not ours.
        let key = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        // A file that vanished between listing and stat is kept at size 0.
        let size = disk::size_or_zero(&path).await?;

        if let Some(check) = check {
            if !check(&path, size) {
                warn!(key = %key, size, "Discarding file rejected by integrity check");
                disk::remove_if_exists(&path).await?;
                continue;
            }
        }

        entries.push(RestoredEntry { key, path, size });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_scan_creates_missing_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("store");

        let entries = scan_root(&root, None).await.unwrap();
        assert!(entries.is_empty());
        assert!(root.is_dir());

        // Re-running against the now-existing root is fine.
        assert!(scan_root(&root, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_keys_are_base_names() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("top"), vec![0u8; 10]).await.unwrap();
        fs::create_dir_all(dir.path().join("nested")).await.unwrap();
        fs::write(dir.path().join("nested/leaf"), vec![0u8; 20])
            .await
            .unwrap();

        let mut entries = scan_root(dir.path(), None).await.unwrap();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "leaf");
        assert_eq!(entries[0].size, 20);
        assert_eq!(entries[1].key, "top");
        assert_eq!(entries[1].size, 10);
    }

    #[tokio::test]
    async fn test_file_vanished_after_listing_is_kept_at_size_zero() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("present");
        fs::write(&present, vec![0u8; 12]).await.unwrap();
        let vanished = dir.path().join("vanished");

        let entries = collect_entries(vec![present, vanished], None).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "present");
        assert_eq!(entries[0].size, 12);
        assert_eq!(entries[1].key, "vanished");
        assert_eq!(entries[1].size, 0);
    }

    #[tokio::test]
    async fn test_integrity_check_rejects_and_deletes() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good");
        let bad = dir.path().join("bad");
        fs::write(&good, vec![0u8; 8]).await.unwrap();
        fs::write(&bad, vec![0u8; 8]).await.unwrap();

        let check: IntegrityCheck =
            Box::new(|path: &Path, _size: u64| path.file_name().unwrap() != "bad");
        let entries = scan_root(dir.path(), Some(&check)).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "good");
        assert!(good.exists());
        assert!(!bad.exists());
    }
}
