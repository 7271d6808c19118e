//! Public types for the capped file store

use serde::{Deserialize, Serialize};

/// Statistics about a store instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Entries across both generations
    pub entries: usize,
    pub active: usize,
    pub idle: usize,
    /// Aggregate size in bytes of every managed file
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}
