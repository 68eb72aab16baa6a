//! Error types for the key store.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for key store operations.
pub type KeyStoreResult<T> = Result<T, KeyStoreError>;

/// Errors that can occur while provisioning or loading key material.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// A required cryptographic capability (e.g. the OS random source) is unavailable.
    #[error("cryptographic provider unavailable: {0}")]
    Configuration(String),

    /// Key material is missing, malformed, or not a P-256 key.
    #[error("invalid key material: {0}")]
    Key(String),

    /// A key file could not be read or written.
    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KeyStoreError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}
