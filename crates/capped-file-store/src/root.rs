//! Storage-root resolution

use std::io;
use std::path::PathBuf;

/// Fixed subdirectory under the provider's base that holds every store
/// instance. The on-disk layout is `<base>/<STORE_ROOT_SEGMENT>/<id>/<key>`.
pub const STORE_ROOT_SEGMENT: &str = "file-store";

/// Resolves the application-private, writable base directory the store nests
/// its managed root under. Resolved once, during [`init`](crate::FileStore::init).
pub trait RootProvider: Send + Sync {
    fn resolve_root(&self) -> io::Result<PathBuf>;
}

impl RootProvider for PathBuf {
    fn resolve_root(&self) -> io::Result<PathBuf> {
        Ok(self.clone())
    }
}
