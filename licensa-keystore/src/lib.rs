//! Key material provisioning for Licensa.
//!
//! This crate owns the vendor's asymmetric key pair:
//! - P-256 (prime256v1) key generation from the OS random source
//! - Validation of stored keys (curve, encoding, pair consistency)
//! - The on-disk key store and its exported public/private key files
//! - Atomic file writes shared with the license crate
//!
//! # Storage Format
//!
//! ```text
//! keys.json                     {"private_key": "<b64>", "public_key": "<b64>"}
//! public_key_for-your-app.txt   <b64 of SPKI PEM>
//! private_key_keep-safe.txt     <b64 of PKCS#8 PEM>
//! ```

mod error;
mod fs;
mod key;
mod store;

pub use error::{KeyStoreError, KeyStoreResult};
pub use fs::{create_new_atomic, write_atomic};
pub use key::{KeyPair, PrivateKey, PublicKey, SCALAR_SIZE};
pub use store::{
    KeyStore, KeyStorePaths, DEFAULT_KEYSTORE_FILE, DEFAULT_PRIVATE_KEY_FILE,
    DEFAULT_PUBLIC_KEY_FILE,
};
