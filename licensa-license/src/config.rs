//! File locations used by the [`License`](crate::License) facade.
//!
//! Every path is explicit; nothing falls back to the process's current
//! directory. [`LicenseConfig::in_dir`] reproduces the conventional file
//! names under a directory the caller chooses.

use crate::error::{LicenseError, LicenseResult};
use licensa_keystore::{KeyStore, KeyStorePaths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default file name of the signed license artifact.
pub const DEFAULT_LICENSE_FILE: &str = "license.txt";

/// Where keys and the license artifact live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseConfig {
    /// Combined JSON key store (issuer side).
    pub keystore_path: PathBuf,
    /// Exported public key, read when verifying.
    pub public_key_path: PathBuf,
    /// Exported private key.
    pub private_key_path: PathBuf,
    /// Signed license artifact.
    pub license_path: PathBuf,
}

impl LicenseConfig {
    /// Uses the conventional file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let keys = KeyStorePaths::in_dir(dir);
        Self {
            keystore_path: keys.keystore,
            public_key_path: keys.public_key,
            private_key_path: keys.private_key,
            license_path: dir.join(DEFAULT_LICENSE_FILE),
        }
    }

    /// Parses a configuration from JSON. All four paths are required.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Configuration`] if the JSON is invalid or a
    /// path is missing.
    pub fn from_json(json: &str) -> LicenseResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| LicenseError::Configuration(format!("invalid license config: {e}")))
    }

    /// Reads a JSON configuration file.
    pub fn load_from(path: &Path) -> LicenseResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            LicenseError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Returns the key file locations.
    #[must_use]
    pub fn key_paths(&self) -> KeyStorePaths {
        KeyStorePaths {
            keystore: self.keystore_path.clone(),
            public_key: self.public_key_path.clone(),
            private_key: self.private_key_path.clone(),
        }
    }

    /// Returns a key store over the configured key files.
    #[must_use]
    pub fn keystore(&self) -> KeyStore {
        KeyStore::new(self.key_paths())
    }
}
