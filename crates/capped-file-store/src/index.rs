//! In-memory entry index and size accounting
//!
//! Entries live in one of two insertion-ordered generations: `active` (warm,
//! never evicted) and `idle` (cold, evicted oldest-first). A key is never
//! present in both at once. The ledger tracks per-key sizes and the running
//! total independently of which generation a key lives in.

use linked_hash_map::LinkedHashMap;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub(crate) struct EntryIndex {
    active: LinkedHashMap<String, PathBuf>,
    idle: LinkedHashMap<String, PathBuf>,
}

impl EntryIndex {
    /// Insert a key as idle, displacing any active entry for the same key.
    pub fn insert_idle(&mut self, key: String, path: PathBuf) {
        self.active.remove(&key);
        self.idle.insert(key, path);
    }

    pub fn get_active(&self, key: &str) -> Option<&PathBuf> {
        self.active.get(key)
    }

    /// Move an idle entry into the active generation, returning its path.
    pub fn promote(&mut self, key: &str) -> Option<PathBuf> {
        let path = self.idle.remove(key)?;
        self.active.insert(key.to_string(), path.clone());
        Some(path)
    }

    /// Oldest-admitted idle entry, removed from the index.
    pub fn pop_oldest_idle(&mut self) -> Option<(String, PathBuf)> {
        self.idle.pop_front()
    }

    /// Remove a key from whichever generation holds it.
    pub fn remove(&mut self, key: &str) -> Option<PathBuf> {
        self.active.remove(key).or_else(|| self.idle.remove(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.active.contains_key(key) || self.idle.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.idle.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn idle_len(&self) -> usize {
        self.idle.len()
    }

    /// Empty both generations, returning every tracked path.
    pub fn drain(&mut self) -> Vec<PathBuf> {
        let active = std::mem::take(&mut self.active);
        let idle = std::mem::take(&mut self.idle);
        active
            .into_iter()
            .chain(idle)
            .map(|(_, path)| path)
            .collect()
    }
}

#[derive(Debug, Default)]
pub(crate) struct SizeLedger {
    sizes: HashMap<String, u64>,
    total: u64,
}

impl SizeLedger {
    /// Record a key's size, replacing any previous size for the same key.
    pub fn record(&mut self, key: &str, size: u64) {
        if let Some(prev) = self.sizes.insert(key.to_string(), size) {
            self.total -= prev;
        }
        self.total += size;
    }

    /// Drop a key's size from the ledger, returning it (0 if untracked).
    pub fn forget(&mut self, key: &str) -> u64 {
        match self.sizes.remove(key) {
            Some(size) => {
                self.total -= size;
                size
            }
            None => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
        self.total = 0;
    }

    #[cfg(test)]
    pub fn size_of(&self, key: &str) -> Option<u64> {
        self.sizes.get(key).copied()
    }
}
