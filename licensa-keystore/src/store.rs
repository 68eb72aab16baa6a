//! On-disk key store.
//!
//! The key store is one JSON file holding both keys
//! (`{"private_key": <base64>, "public_key": <base64>}`) plus two exported
//! copies as plain base64 text: the public key to ship with an application
//! and the private key to keep with the vendor.
//!
//! The JSON file is the source of truth. It is claimed with create-new
//! semantics, so concurrent first calls agree on a single key pair; the
//! exported copies are (re)written afterwards. An export that is missing or
//! holds a different key is rewritten from the JSON file on every load.

use crate::error::{KeyStoreError, KeyStoreResult};
use crate::fs::{create_new_atomic, write_atomic};
use crate::key::{KeyPair, PrivateKey, PublicKey};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Default file name of the combined key store.
pub const DEFAULT_KEYSTORE_FILE: &str = "keys.json";

/// Default file name of the exported public key.
pub const DEFAULT_PUBLIC_KEY_FILE: &str = "public_key_for-your-app.txt";

/// Default file name of the exported private key.
pub const DEFAULT_PRIVATE_KEY_FILE: &str = "private_key_keep-safe.txt";

/// Locations of the three key files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStorePaths {
    /// Combined JSON key store.
    pub keystore: PathBuf,
    /// Exported public key (base64 text).
    pub public_key: PathBuf,
    /// Exported private key (base64 text).
    pub private_key: PathBuf,
}

impl KeyStorePaths {
    /// Uses the default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            keystore: dir.join(DEFAULT_KEYSTORE_FILE),
            public_key: dir.join(DEFAULT_PUBLIC_KEY_FILE),
            private_key: dir.join(DEFAULT_PRIVATE_KEY_FILE),
        }
    }
}

/// Serialized layout of the combined key-store file. Field order is fixed.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct KeyStoreFile {
    private_key: String,
    public_key: String,
}

impl From<&KeyPair> for KeyStoreFile {
    fn from(pair: &KeyPair) -> Self {
        Self {
            private_key: pair.private_key().encoded().to_string(),
            public_key: pair.public_key().encoded().to_string(),
        }
    }
}

/// Loads, validates, and lazily provisions the key pair.
#[derive(Debug, Clone)]
pub struct KeyStore {
    paths: KeyStorePaths,
}

impl KeyStore {
    /// Creates a key store over the given file locations. Nothing is touched
    /// on disk until a load.
    #[must_use]
    pub fn new(paths: KeyStorePaths) -> Self {
        Self { paths }
    }

    /// Returns the configured file locations.
    #[must_use]
    pub fn paths(&self) -> &KeyStorePaths {
        &self.paths
    }

    /// Returns true if the combined key-store file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.paths.keystore.exists()
    }

    /// Returns the stored key pair, generating and persisting a new P-256
    /// pair if the key store does not exist yet.
    ///
    /// An existing key store is validated, never regenerated: a corrupt file
    /// fails with [`KeyStoreError::Key`]. Exported key files that are
    /// missing, unreadable as keys, or hold another pair are rewritten from
    /// the key store.
    ///
    /// # Errors
    ///
    /// - [`KeyStoreError::Configuration`] if no randomness is available; no
    ///   files are written in that case.
    /// - [`KeyStoreError::Key`] if stored key material is invalid.
    /// - [`KeyStoreError::Storage`] if a key file cannot be read or written.
    pub fn load_or_create(&self) -> KeyStoreResult<KeyPair> {
        if self.exists() {
            let pair = self.load()?;
            self.sync_exports(&pair)?;
            return Ok(pair);
        }

        let pair = KeyPair::generate()?;
        let json = serde_json::to_vec(&KeyStoreFile::from(&pair))?;
        if !create_new_atomic(&self.paths.keystore, &json)? {
            debug!(
                path = %self.paths.keystore.display(),
                "key store created concurrently, using the existing pair"
            );
            let pair = self.load()?;
            self.sync_exports(&pair)?;
            return Ok(pair);
        }

        write_atomic(&self.paths.public_key, pair.public_key().encoded().as_bytes())?;
        write_atomic(&self.paths.private_key, pair.private_key().encoded().as_bytes())?;
        info!(
            path = %self.paths.keystore.display(),
            "generated new P-256 key pair"
        );
        Ok(pair)
    }

    /// Loads and validates the key pair from the combined key-store file.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Key`] if the file is missing or holds invalid
    /// key material, and [`KeyStoreError::Storage`] if it cannot be read.
    pub fn load(&self) -> KeyStoreResult<KeyPair> {
        let path = &self.paths.keystore;
        let raw = read_key_file(path)?;
        let file: KeyStoreFile = serde_json::from_str(&raw).map_err(|e| {
            warn!(path = %path.display(), "key store is not valid JSON");
            KeyStoreError::Key(format!("unreadable key store {}: {e}", path.display()))
        })?;
        let pair = KeyPair::from_encoded(&file.private_key, &file.public_key)?;
        debug!(path = %path.display(), "loaded key pair");
        Ok(pair)
    }

    /// Reads and validates the exported public key file.
    pub fn read_public_key(&self) -> KeyStoreResult<PublicKey> {
        PublicKey::from_encoded(&read_key_file(&self.paths.public_key)?)
    }

    /// Reads and validates the exported private key file.
    pub fn read_private_key(&self) -> KeyStoreResult<PrivateKey> {
        let raw = Zeroizing::new(read_key_file(&self.paths.private_key)?);
        PrivateKey::from_encoded(&raw)
    }

    fn sync_exports(&self, pair: &KeyPair) -> KeyStoreResult<()> {
        let public = read_export(&self.paths.public_key)?;
        if !public
            .as_deref()
            .is_some_and(|raw| public_export_matches(raw, pair))
        {
            restore_export(
                &self.paths.public_key,
                pair.public_key().encoded(),
                public.is_some(),
            )?;
        }

        let private = read_export(&self.paths.private_key)?;
        if !private
            .as_deref()
            .is_some_and(|raw| private_export_matches(raw, pair))
        {
            restore_export(
                &self.paths.private_key,
                pair.private_key().encoded(),
                private.is_some(),
            )?;
        }
        Ok(())
    }
}

fn read_export(path: &Path) -> KeyStoreResult<Option<Zeroizing<Vec<u8>>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(Zeroizing::new(bytes))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(KeyStoreError::storage(path, e)),
    }
}

fn public_export_matches(raw: &[u8], pair: &KeyPair) -> bool {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|text| PublicKey::from_encoded(text).ok())
        .is_some_and(|key| &key == pair.public_key())
}

fn private_export_matches(raw: &[u8], pair: &KeyPair) -> bool {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|text| PrivateKey::from_encoded(text).ok())
        .and_then(|key| key.public_key().ok())
        .is_some_and(|key| &key == pair.public_key())
}

fn restore_export(path: &Path, encoded: &str, stale: bool) -> KeyStoreResult<()> {
    write_atomic(path, encoded.as_bytes())?;
    if stale {
        warn!(path = %path.display(), "replaced exported key that did not match the key store");
    } else {
        info!(path = %path.display(), "restored missing exported key");
    }
    Ok(())
}

fn read_key_file(path: &Path) -> KeyStoreResult<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            KeyStoreError::Key(format!("key file not found: {}", path.display()))
        }
        _ => KeyStoreError::storage(path, e),
    })
}
