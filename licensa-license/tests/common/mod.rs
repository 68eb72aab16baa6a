//! Shared test helpers for license tests.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use licensa_license::{KeyPair, LicenseConfig, SignedLicense, UnsignedLicense};
use serde_json::{Map, Value};
use std::path::Path;

/// Fixed expiry used where the exact value matters (2023-11-14T22:13:20Z).
pub const FIXED_VALID_UNTIL: i64 = 1_700_000_000;

/// Returns a fresh P-256 key pair.
pub fn test_keypair() -> KeyPair {
    KeyPair::generate().expect("key generation")
}

/// Default file layout inside `dir`.
pub fn config_in(dir: &Path) -> LicenseConfig {
    LicenseConfig::in_dir(dir)
}

/// The license from the usage example, valid for `days` days.
pub fn acme_license(days: u32) -> UnsignedLicense {
    UnsignedLicense::issue("Acme Corp", "OneCloud", ["module_disclosure"], days)
}

/// Signs `license` with `keys`.
pub fn signed(license: UnsignedLicense, keys: &KeyPair) -> SignedLicense {
    license.sign(keys.private_key()).expect("signing")
}

/// Decodes an artifact to its JSON object, applies `edit`, and re-encodes it
/// without touching the signature.
pub fn tamper(artifact: &str, edit: impl FnOnce(&mut Map<String, Value>)) -> String {
    let json = BASE64.decode(artifact).expect("artifact is base64");
    let mut value: Value = serde_json::from_slice(&json).expect("artifact is JSON");
    edit(value.as_object_mut().expect("artifact is an object"));
    BASE64.encode(serde_json::to_vec(&value).expect("re-encode"))
}

/// Base64-encodes arbitrary JSON text as an artifact.
pub fn artifact_from_json(json: &str) -> String {
    BASE64.encode(json)
}
