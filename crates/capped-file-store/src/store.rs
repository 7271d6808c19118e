//! The store itself: commit protocol, admission control, lifecycle

use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::disk;
use crate::error::{Result, StoreError};
use crate::index::{EntryIndex, SizeLedger};
use crate::restore::{self, IntegrityCheck};
use crate::root::{RootProvider, STORE_ROOT_SEGMENT};
use crate::types::StoreStats;

/// Default capacity: 5 GiB
pub const DEFAULT_CAPACITY: u64 = 5 * 1024 * 1024 * 1024;

#[derive(Default)]
struct State {
    index: EntryIndex,
    ledger: SizeLedger,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Bounded-capacity, disk-backed key-value cache.
///
/// Values are written by the caller between [`touch`](Self::touch) and
/// [`set`](Self::set); the store only tracks the resulting files and keeps
/// their aggregate size under the configured capacity by evicting idle
/// entries oldest-first. Entries not yet requested through
/// [`get`](Self::get) stay idle and are the first eviction candidates; a
/// `get` hit promotes the entry to the active generation, which is never
/// evicted.
///
/// All state is private to the instance behind one async mutex. Two
/// instances with the same `id` over the same base directory hold
/// independent ledgers and are not safe to use concurrently.
pub struct FileStore {
    id: String,
    capacity: u64,
    provider: Box<dyn RootProvider>,
    integrity_check: Option<IntegrityCheck>,
    /// Set once `init` has resolved the root and restored the index;
    /// doubles as the Ready marker for every other operation.
    root: OnceCell<PathBuf>,
    state: Mutex<State>,
}

impl FileStore {
    /// Create a store with the default 5 GiB capacity.
    pub fn new(id: impl Into<String>, provider: impl RootProvider + 'static) -> Self {
        Self::with_capacity(id, provider, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(
        id: impl Into<String>,
        provider: impl RootProvider + 'static,
        capacity: u64,
    ) -> Self {
        Self {
            id: id.into(),
            capacity,
            provider: Box::new(provider),
            integrity_check: None,
            root: OnceCell::new(),
            state: Mutex::new(State::default()),
        }
    }

    /// Install a restore-time integrity hook. Each file discovered during
    /// restore is passed with its size; returning `false` deletes the file
    /// and leaves it unindexed. Must be called before `init`.
    pub fn with_integrity_check(
        mut self,
        check: impl Fn(&Path, u64) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.integrity_check = Some(Box::new(check));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Resolve the root directory and restore the index from whatever files
    /// already exist there. Idempotent and single-flight: concurrent and
    /// repeated callers observe exactly one restore pass. A failed `init` is
    /// not memoized; a later call retries.
    pub async fn init(&self) -> Result<()> {
        self.root.get_or_try_init(|| self.restore_from_disk()).await?;
        Ok(())
    }

    async fn restore_from_disk(&self) -> Result<PathBuf> {
        let base = self.provider.resolve_root()?;
        let root = base.join(STORE_ROOT_SEGMENT).join(&self.id);
        let entries = restore::scan_root(&root, self.integrity_check.as_ref()).await?;

        let mut state = self.state.lock().await;
        for entry in entries {
            state.ledger.record(&entry.key, entry.size);
            state.index.insert_idle(entry.key, entry.path);
        }
        info!(
            id = %self.id,
            entries = state.index.len(),
            total_size = state.ledger.total(),
            "Restored store from disk"
        );
        Ok(root)
    }

    fn ensure_ready(&self) -> Result<&PathBuf> {
        self.root.get().ok_or(StoreError::Uninitialized)
    }

    /// Reserve the on-disk path for `key` without creating anything there.
    ///
    /// The caller writes the value's bytes to the returned path, then commits
    /// with [`set`](Self::set). `key` must be usable as a file name
    /// component; it is not sanitized. The empty key yields the root itself.
    pub fn touch(&self, key: &str) -> Result<PathBuf> {
        let root = self.ensure_ready()?;
        Ok(root.join(key))
    }

    /// Look up `key`, promoting an idle hit to the active generation.
    /// A miss has no side effects.
    pub async fn get(&self, key: &str) -> Result<Option<PathBuf>> {
        self.ensure_ready()?;
        let mut state = self.state.lock().await;

        if let Some(path) = state.index.get_active(key).cloned() {
            state.hits += 1;
            return Ok(Some(path));
        }
        if let Some(path) = state.index.promote(key) {
            state.hits += 1;
            debug!(key, "Promoted idle entry");
            return Ok(Some(path));
        }

        state.misses += 1;
        Ok(None)
    }

    /// Commit the value the caller wrote at `path` (which must have come from
    /// `touch(key)`, and must not be written again).
    ///
    /// Measures the file's current size, then admits it if it fits within
    /// capacity, evicting idle entries oldest-first as needed. A re-set
    /// drops the key's previous entry first, so only the new size counts.
    /// Returns `Ok(false)` if it cannot fit even with the idle generation
    /// exhausted; the candidate file is deleted and the key left absent.
    /// The committed entry is idle until the first `get`.
    pub async fn set(&self, key: &str, path: &Path) -> Result<bool> {
        self.ensure_ready()?;
        let size = disk::size_or_zero(path).await?;
        let mut state = self.state.lock().await;

        // A re-set replaces the previous entry for the key up front: the old
        // size no longer counts against the candidate, the eviction loop can
        // never select the candidate's own file, and a rejection leaves no
        // entry pointing at a deleted file.
        if state.index.remove(key).is_some() {
            state.ledger.forget(key);
        }

        while state.ledger.total() + size > self.capacity {
            let Some((evicted_key, evicted_path)) = state.index.pop_oldest_idle() else {
                break;
            };
            let freed = state.ledger.forget(&evicted_key);
            state.evictions += 1;
            debug!(key = %evicted_key, freed, "Evicted idle entry");
            disk::remove_if_exists(&evicted_path).await?;
        }

        if state.ledger.total() + size > self.capacity {
            warn!(
                key,
                size,
                total = state.ledger.total(),
                capacity = self.capacity,
                "Rejected entry over capacity"
            );
            disk::remove_if_exists(path).await?;
            return Ok(false);
        }

        state.ledger.record(key, size);
        state.index.insert_idle(key.to_string(), path.to_path_buf());
        debug!(key, size, total = state.ledger.total(), "Committed entry");
        Ok(true)
    }

    /// Drop one entry from either generation and delete its file.
    /// Returns `Ok(false)` if the key is absent.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        self.ensure_ready()?;
        let mut state = self.state.lock().await;

        match state.index.remove(key) {
            Some(path) => {
                state.ledger.forget(key);
                disk::remove_if_exists(&path).await?;
                debug!(key, "Removed entry");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete every managed file and reset the index, ledger, and counters.
    pub async fn clear(&self) -> Result<()> {
        self.ensure_ready()?;
        let mut state = self.state.lock().await;

        for path in state.index.drain() {
            disk::remove_if_exists(&path).await?;
        }
        state.ledger.clear();
        state.hits = 0;
        state.misses = 0;
        state.evictions = 0;
        info!(id = %self.id, "Cleared store");
        Ok(())
    }

    /// Membership test across both generations; never promotes.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        self.ensure_ready()?;
        let state = self.state.lock().await;
        Ok(state.index.contains(key))
    }

    pub async fn len(&self) -> Result<usize> {
        self.ensure_ready()?;
        let state = self.state.lock().await;
        Ok(state.index.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        self.ensure_ready()?;
        let state = self.state.lock().await;
        Ok(StoreStats {
            entries: state.index.len(),
            active: state.index.active_len(),
            idle: state.index.idle_len(),
            total_size: state.ledger.total(),
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
        })
    }
}
