//! Error types for the licensing module.

use licensa_keystore::KeyStoreError;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// A required cryptographic capability or configuration is unavailable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Key file missing, unreadable, or not valid P-256 key material.
    #[error("key error: {0}")]
    Key(String),

    /// A license or key file could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// License content is not base64/JSON or is missing required fields.
    #[error("malformed license artifact: {0}")]
    MalformedArtifact(String),

    /// The signing primitive failed.
    #[error("signature operation failed: {0}")]
    Signature(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<KeyStoreError> for LicenseError {
    fn from(err: KeyStoreError) -> Self {
        match err {
            KeyStoreError::Configuration(msg) => Self::Configuration(msg),
            KeyStoreError::Key(msg) => Self::Key(msg),
            err @ KeyStoreError::Storage { .. } => Self::Storage(err.to_string()),
            KeyStoreError::Serialization(e) => Self::Serialization(e),
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
