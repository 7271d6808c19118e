//! Error types for the capped file store

use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// A public operation other than `init` was called before `init` completed.
    Uninitialized,
    Io(Box<std::io::Error>),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Uninitialized => write!(f, "Store used before init() completed"),
            StoreError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
