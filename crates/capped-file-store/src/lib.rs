//! Bounded-capacity, disk-backed key-value file cache
//!
//! Stores arbitrarily large values as files under a managed directory while
//! keeping their aggregate size under a configured capacity. The store never
//! writes value bytes itself: a caller reserves a path with
//! [`FileStore::touch`], writes the value out-of-band, then commits the
//! measured size with [`FileStore::set`]. Cached data survives process
//! restarts; [`FileStore::init`] rebuilds the index from whatever files
//! already exist on disk.
//!
//! Entries split into two generations. Committed and restored entries start
//! idle and are evicted oldest-first when a new entry needs room; a
//! [`FileStore::get`] hit promotes an entry to active, which is never
//! evicted.
//!
//! # Example
//!
//! ```no_run
//! use capped_file_store::FileStore;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), capped_file_store::StoreError> {
//! let store = FileStore::with_capacity(
//!     "thumbnails",
//!     PathBuf::from("/var/cache/app"),
//!     64 * 1024 * 1024,
//! );
//! store.init().await?;
//!
//! if store.get("photo-1").await?.is_none() {
//!     let path = store.touch("photo-1")?;
//!     tokio::fs::write(&path, b"...").await?;
//!     store.set("photo-1", &path).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod disk;
mod error;
mod index;
mod restore;
mod root;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use root::{RootProvider, STORE_ROOT_SEGMENT};
pub use store::{FileStore, DEFAULT_CAPACITY};
pub use types::StoreStats;
